//! The deck aggregator: three derived views over three read-side
//! collaborators.

use std::sync::Arc;

use cardroom_protocol::{CardPlacement, DeckSummary, DraftCardView, RoomId};
use cardroom_transport::{
    CatalogReader, Diagnostic, DiagnosticsSink, DiscardStage, PlacementReader, RoomReader,
    TracingSink, TransportError,
};
use futures_util::future::join_all;
use serde::Serialize;

use crate::DeckConfig;

// ---------------------------------------------------------------------------
// DeckView
// ---------------------------------------------------------------------------

/// Everything the deck panel of one room shows.
///
/// Each field degrades on its own: a missing image does not hide the
/// counters, and a failed draft read does not hide the image.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeckView {
    pub counts: Option<DeckSummary>,
    pub discard_top_image: Option<String>,
    pub draft: Vec<DraftCardView>,
}

// ---------------------------------------------------------------------------
// DeckAggregator
// ---------------------------------------------------------------------------

/// Joins room state, card placements and the card catalog into the views
/// of the deck panel.
///
/// No operation returns an error. Failed reads are reported to the
/// configured [`DiagnosticsSink`] and show up to the caller only as
/// missing data.
pub struct DeckAggregator<R, P, K> {
    rooms: R,
    placements: P,
    catalog: K,
    config: DeckConfig,
    sink: Arc<dyn DiagnosticsSink>,
}

impl<R, P, K> DeckAggregator<R, P, K>
where
    R: RoomReader,
    P: PlacementReader,
    K: CatalogReader,
{
    /// Creates an aggregator that logs its diagnostics through `tracing`.
    pub fn new(rooms: R, placements: P, catalog: K) -> Self {
        Self {
            rooms,
            placements,
            catalog,
            config: DeckConfig::default(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replaces the diagnostics sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: DeckConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DeckConfig {
        &self.config
    }

    /// The image of the card on top of the discard pile.
    ///
    /// Reads the room, then the top-of-discard placement, then the catalog
    /// entry for that card. The first failed read ends the chain: the
    /// result is `None` and a [`Diagnostic::DiscardTopUnavailable`] names
    /// the failing stage. An empty discard pile is also `None`, without a
    /// diagnostic.
    pub async fn discard_top_image(&self, room: RoomId) -> Option<String> {
        match self.discard_top_chain(room).await {
            Ok(image) => image,
            Err((stage, error)) => {
                self.sink.report(Diagnostic::DiscardTopUnavailable { room, stage, error });
                None
            }
        }
    }

    async fn discard_top_chain(
        &self,
        room: RoomId,
    ) -> Result<Option<String>, (DiscardStage, TransportError)> {
        let record = self
            .rooms
            .get_room(room)
            .await
            .map_err(|e| (DiscardStage::Room, e))?;
        if record.discard_top == 0 {
            tracing::trace!(%room, "discard pile empty");
            return Ok(None);
        }

        let top = self
            .placements
            .top_discard(room)
            .await
            .map_err(|e| (DiscardStage::Placement, e))?;
        let Some(top) = top else {
            tracing::trace!(%room, "no placement on top of the discard pile");
            return Ok(None);
        };

        let card = self
            .catalog
            .get_card(top.card_id)
            .await
            .map_err(|e| (DiscardStage::Catalog, e))?;
        Ok(Some(card.image_url))
    }

    /// Draw and discard pile counters, both from one room read.
    pub async fn deck_counts(&self, room: RoomId) -> Option<DeckSummary> {
        match self.rooms.get_room(room).await {
            Ok(record) => Some(DeckSummary::from(&record)),
            Err(error) => {
                self.sink.report(Diagnostic::DeckCountsUnavailable { room, error });
                None
            }
        }
    }

    /// The draft row, each card enriched with its catalog data.
    ///
    /// If the placement list itself cannot be read the row is empty.
    /// Otherwise every card is looked up concurrently; a card whose lookup
    /// fails comes back bare while its siblings are unaffected. The result
    /// keeps the order of the placement list.
    pub async fn draft_cards_enriched(&self, room: RoomId) -> Vec<DraftCardView> {
        let deck = &self.config.draft_deck;
        let placements = match self.placements.placements_in_deck(room, deck).await {
            Ok(placements) => placements,
            Err(error) => {
                self.sink.report(Diagnostic::DraftListFailed { room, error });
                return Vec::new();
            }
        };

        let cards = join_all(placements.into_iter().map(|p| self.enrich(room, p))).await;
        tracing::debug!(
            %room,
            %deck,
            cards = cards.len(),
            enriched = cards.iter().filter(|c| c.is_enriched()).count(),
            "draft row assembled"
        );
        cards
    }

    async fn enrich(&self, room: RoomId, placement: CardPlacement) -> DraftCardView {
        let card = placement.card_id;
        match self.catalog.get_card(card).await {
            Ok(entry) => DraftCardView::enriched(placement, &entry),
            Err(error) => {
                self.sink.report(Diagnostic::EnrichmentFailed { room, card, error });
                DraftCardView::bare(placement)
            }
        }
    }

    /// Loads the counters, the discard-top image and the draft row
    /// concurrently.
    pub async fn deck_view(&self, room: RoomId) -> DeckView {
        let (counts, discard_top_image, draft) = tokio::join!(
            self.deck_counts(room),
            self.discard_top_image(room),
            self.draft_cards_enriched(room),
        );
        DeckView {
            counts,
            discard_top_image,
            draft,
        }
    }
}
