//! Trading Deck
//!
//! Swipe session over memecoin cards. Each committed swipe fires a notice and
//! moves to the next card; watch swipes also land on the session watchlist.
//! No trade is sent anywhere from here.

use crate::domain::{MemeCard, SwipeDeck, SwipeDirection, SwipeIntent, SwipeResolution, Vector2};
use crate::ports::{Notice, Notifier};

/// What happened to a card that left the deck
#[derive(Debug, Clone, PartialEq)]
pub struct DeckEvent {
    pub symbol: String,
    pub intent: SwipeIntent,
    pub next_symbol: Option<String>,
}

pub struct TradingDeck<N> {
    deck: SwipeDeck<MemeCard>,
    notifier: N,
    watchlist: Vec<String>,
}

impl<N: Notifier> TradingDeck<N> {
    pub fn new(cards: Vec<MemeCard>, notifier: N) -> Self {
        Self {
            deck: SwipeDeck::new(cards),
            notifier,
            watchlist: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&MemeCard> {
        self.deck.current()
    }

    pub fn watchlist(&self) -> &[String] {
        &self.watchlist
    }

    pub fn drag_to(&mut self, offset: Vector2) -> Option<SwipeIntent> {
        self.deck.drag_to(offset)
    }

    /// Release the dragged card. `None` means it snapped back.
    pub fn release(&mut self, velocity: Vector2) -> Option<DeckEvent> {
        let resolution = self.deck.release(velocity)?;
        self.apply(resolution)
    }

    /// Button-driven swipe
    pub fn swipe(&mut self, direction: SwipeDirection) -> Option<DeckEvent> {
        let resolution = self.deck.commit(direction)?;
        self.apply(resolution)
    }

    fn apply(&mut self, resolution: SwipeResolution) -> Option<DeckEvent> {
        let card = self.deck.card(resolution.card_index).cloned()?;

        let notice = match resolution.intent {
            SwipeIntent::Pass => Notice::info("Passed").with_body(card.symbol.clone()),
            SwipeIntent::Watch => {
                if !self.watchlist.contains(&card.symbol) {
                    self.watchlist.push(card.symbol.clone());
                }
                Notice::success("Added to Watchlist").with_body(card.symbol.clone())
            }
            SwipeIntent::Invest => Notice::success("Investment Placed")
                .with_body(format!("{} ({})", card.name, card.symbol)),
        };

        tracing::debug!(symbol = %card.symbol, intent = %resolution.intent, "Card swiped");
        self.notifier.notify(notice);

        Some(DeckEvent {
            symbol: card.symbol,
            intent: resolution.intent,
            next_symbol: self.deck.current().map(|c| c.symbol.clone()),
        })
    }
}
