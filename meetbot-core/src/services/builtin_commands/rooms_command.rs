use meetbot_common::models::{FoundRoom, Reply};
use crate::config::RoomRegion;
use crate::services::builtin_commands::CommandContext;
use crate::Error;

/// `rooms`: every bookable room in a known region.
pub async fn handle_rooms(ctx: &CommandContext<'_>) -> Result<Reply, Error> {
    let rooms = ctx.directory.find_rooms(ctx.token).await?;
    let text = render_rooms(&rooms, &ctx.config.room_regions);
    if text.is_empty() {
        return Ok(Reply::text("No rooms found."));
    }
    Ok(Reply::Text(text))
}

fn region_of<'r>(room: &FoundRoom, regions: &'r [RoomRegion]) -> Option<&'r RoomRegion> {
    let address = room.address.as_deref()?;
    regions.iter().find(|r| address.starts_with(r.prefix.as_str()))
}

pub fn render_rooms(rooms: &[FoundRoom], regions: &[RoomRegion]) -> String {
    rooms
        .iter()
        .filter_map(|room| {
            let region = region_of(room, regions)?;
            Some(format!(
                "rooms[{}]: \nname: {}\naddress: {}",
                region.label,
                room.name,
                room.address.as_deref().unwrap_or_default()
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BotConfig;

    fn room(name: &str, address: Option<&str>) -> FoundRoom {
        FoundRoom { name: name.into(), address: address.map(str::to_string) }
    }

    #[test]
    fn only_rooms_in_known_regions_are_listed() {
        let regions = BotConfig::default().room_regions;
        let rooms = vec![
            room("Lotus", Some("SH-Lotus@corp.example")),
            room("Paris", Some("FR-Paris@corp.example")),
            room("Orphan", None),
            room("Harbor", Some("DL-Harbor@corp.example")),
        ];
        assert_eq!(
            render_rooms(&rooms, &regions),
            "rooms[ShangHai]: \nname: Lotus\naddress: SH-Lotus@corp.example\n\
             rooms[DaLian]: \nname: Harbor\naddress: DL-Harbor@corp.example"
        );
    }
}
