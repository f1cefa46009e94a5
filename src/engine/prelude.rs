pub use crate::engine::{
    actions::*,
    card::*,
    card_store::*,
    combat::*,
    config::*,
    database::*,
    deck::*,
    effect::*,
    effect_stack::*,
    error::*,
    game::*,
    game_state_snapshot::*,
    keyword::*,
    link::*,
    messages::*,
    player::*,
    state_based_actions::*,
    team::*,
    turn::*,
    util::id::*,
    zone::*,
};
