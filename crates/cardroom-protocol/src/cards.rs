//! Card placement, catalog, and the derived views of the deck panel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{CardId, GameRoomRecord, RoomId};

/// Where a card currently sits within a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPosition {
    /// The draw pile.
    MazoRobo,
    /// The discard pile.
    MazoDescarte,
    /// The face-up draft pool players pick from.
    MazoDraft,
    /// Played in front of a player.
    OnTable,
}

/// Opaque name of a deck inside a room, as the placement service knows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckName(pub String);

impl DeckName {
    /// The draft deck.
    pub fn draft() -> Self {
        Self("mazo_draft".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeckName {
    fn default() -> Self {
        Self::draft()
    }
}

impl fmt::Display for DeckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A card's placement within one game: which card, in which pile, at
/// which depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPlacement {
    pub game_id: RoomId,
    pub card_id: CardId,
    #[serde(default)]
    pub card_position: Option<CardPosition>,
    #[serde(default)]
    pub card_order: Option<u32>,
}

/// Descriptive catalog data for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCard {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
}

/// A draft-deck card as the renderer receives it.
///
/// The placement is always present. The catalog fields are filled only
/// when the card's catalog lookup succeeded, and are omitted from JSON
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftCardView {
    #[serde(flatten)]
    pub placement: CardPlacement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub card_type: Option<String>,
}

impl DraftCardView {
    /// A placement without catalog data.
    pub fn bare(placement: CardPlacement) -> Self {
        Self {
            placement,
            image_url: None,
            name: None,
            card_type: None,
        }
    }

    /// A placement enriched with `card`'s image, name and type.
    pub fn enriched(placement: CardPlacement, card: &CatalogCard) -> Self {
        Self {
            placement,
            image_url: Some(card.image_url.clone()),
            name: Some(card.name.clone()),
            card_type: card.card_type.clone(),
        }
    }

    pub fn card_id(&self) -> CardId {
        self.placement.card_id
    }

    /// Returns `true` if catalog data was attached.
    pub fn is_enriched(&self) -> bool {
        self.image_url.is_some() || self.name.is_some()
    }
}

/// Pile sizes of a room, as shown next to the draw and discard piles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckSummary {
    pub draw_top: u32,
    pub discard_top: u32,
}

impl From<&GameRoomRecord> for DeckSummary {
    fn from(room: &GameRoomRecord) -> Self {
        Self {
            draw_top: room.draw_top,
            discard_top: room.discard_top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn placement(card: u64) -> CardPlacement {
        CardPlacement {
            game_id: RoomId(1),
            card_id: CardId(card),
            card_position: Some(CardPosition::MazoDraft),
            card_order: Some(0),
        }
    }

    #[test]
    fn test_card_position_wire_names() {
        let json = serde_json::to_value(CardPosition::MazoDescarte).unwrap();
        assert_eq!(json, "mazo_descarte");
        let pos: CardPosition = serde_json::from_value(json!("on_table")).unwrap();
        assert_eq!(pos, CardPosition::OnTable);
    }

    #[test]
    fn test_draft_deck_name() {
        assert_eq!(DeckName::draft().as_str(), "mazo_draft");
        assert_eq!(DeckName::default(), DeckName::draft());
    }

    #[test]
    fn test_placement_accepts_null_position() {
        let p: CardPlacement = serde_json::from_value(
            json!({"game_id": 1, "card_id": 5, "card_position": null}),
        )
        .unwrap();
        assert_eq!(p.card_position, None);
        assert_eq!(p.card_order, None);
    }

    #[test]
    fn test_catalog_card_reads_type_field() {
        let card: CatalogCard = serde_json::from_value(json!({
            "id": 5,
            "name": "C5",
            "description": "",
            "image_url": "i5",
            "type": "event"
        }))
        .unwrap();
        assert_eq!(card.card_type.as_deref(), Some("event"));
    }

    #[test]
    fn test_bare_view_serializes_placement_only() {
        let view = DraftCardView::bare(placement(6));
        assert!(!view.is_enriched());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["card_id"], 6);
        assert!(json.get("image_url").is_none());
        assert!(json.get("name").is_none());
        assert!(json.get("type").is_none());
    }

    #[test]
    fn test_enriched_view_copies_catalog_fields() {
        let card = CatalogCard {
            id: CardId(5),
            name: "C5".into(),
            description: String::new(),
            image_url: "i5".into(),
            card_type: None,
        };
        let view = DraftCardView::enriched(placement(5), &card);
        assert!(view.is_enriched());
        assert_eq!(view.card_id(), CardId(5));
        assert_eq!(view.image_url.as_deref(), Some("i5"));
        assert_eq!(view.name.as_deref(), Some("C5"));
        assert_eq!(view.card_type, None);
    }

    #[test]
    fn test_deck_summary_from_room() {
        let mut room = GameRoomRecord::new(RoomId(1), "A");
        room.draw_top = 30;
        room.discard_top = 4;
        assert_eq!(
            DeckSummary::from(&room),
            DeckSummary { draw_top: 30, discard_top: 4 }
        );
    }
}
