mod util;

pub mod actions;
pub mod card;
pub mod card_store;
pub mod combat;
pub mod config;
pub mod database;
pub mod deck;
pub mod effect;
pub mod effect_stack;
pub mod error;
pub mod game;
pub mod game_state_snapshot;
pub mod keyword;
pub mod link;
pub mod messages;
pub mod player;
pub mod state_based_actions;
pub mod team;
pub mod turn;
pub mod zone;

pub mod prelude;

#[cfg(test)]
pub(crate) mod test_support;
