pub mod wallet_store;
pub mod trading_deck;
pub mod poller;
pub mod trader_board;

pub use wallet_store::{StoreError, WalletState, WalletStore};
pub use trading_deck::{DeckEvent, TradingDeck};
pub use poller::{Poller, DEFAULT_REFRESH_INTERVAL};
pub use trader_board::TraderBoard;
