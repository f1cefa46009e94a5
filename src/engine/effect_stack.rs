//! Pending effects and the order they resolve in.

use std::collections::BTreeMap;

use log::{debug, error, info};

use super::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectPriority {
    Normal,
    Trigger,
    Burst,
    Negation,
}

impl EffectPriority {
    pub fn of(effect: &EffectDefinition) -> Self {
        if effect.is_negation() {
            EffectPriority::Negation
        } else if effect.timing == EffectTiming::Burst {
            EffectPriority::Burst
        } else if effect.timing.is_trigger() {
            EffectPriority::Trigger
        } else {
            EffectPriority::Normal
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EffectStackEntry {
    pub source: CardInstanceID,
    pub owner: PlayerID,
    pub effect: EffectDefinition,
    pub priority: EffectPriority,
    pub index: u64,
    /// Entries pushed while another one resolves sit one level deeper and
    /// so go first.
    pub depth: u32,
    pub owner_is_active: bool,
    pub resolved: bool,
    /// Battle Area units present when a continuous effect was pushed.
    pub snapshot: Option<Vec<CardInstanceID>>,
    pub target: Option<CardInstanceID>,
    /// Costs were already paid when the ability was activated.
    pub prepaid: bool,
}

impl EffectStackEntry {
    fn sort_key(&self) -> (u32, EffectPriority, bool, u64) {
        (self.depth, self.priority, self.owner_is_active, self.index)
    }

    pub fn is_unit_in_snapshot(&self, unit: CardInstanceID) -> bool {
        self.snapshot.as_ref().is_some_and(|units| units.contains(&unit))
    }
}

/// Kept sorted so that the last entry is the one to resolve next.
#[derive(Clone, Debug, Default)]
pub struct EffectStack {
    entries: Vec<EffectStackEntry>,
    next_index: u64,
    resolving_depth: Option<u32>,
    turn_registry: BTreeMap<u32, Vec<EffectStackEntry>>,
}

impl EffectStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bottom first.
    pub fn entries(&self) -> &[EffectStackEntry] {
        &self.entries
    }

    pub fn peek(&self) -> Option<&EffectStackEntry> {
        self.entries.last()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn push(
        &mut self,
        source: CardInstanceID,
        owner: PlayerID,
        effect: EffectDefinition,
        owner_is_active: bool,
        snapshot: Option<Vec<CardInstanceID>>,
        target: Option<CardInstanceID>,
        prepaid: bool,
    ) -> u64 {
        let index = self.next_index;
        self.next_index += 1;
        let entry = EffectStackEntry {
            source,
            owner,
            priority: EffectPriority::of(&effect),
            effect,
            index,
            depth: self.resolving_depth.map_or(0, |depth| depth + 1),
            owner_is_active,
            resolved: false,
            snapshot,
            target,
            prepaid,
        };
        self.entries.push(entry);
        self.entries.sort_by_key(EffectStackEntry::sort_key);
        index
    }

    pub fn pop(&mut self) -> Option<EffectStackEntry> {
        self.entries.pop()
    }

    /// Pops the top entry and makes anything pushed from now on interrupt
    /// what is left.
    fn begin_next(&mut self) -> Option<EffectStackEntry> {
        let entry = self.entries.pop()?;
        self.resolving_depth = Some(entry.depth);
        Some(entry)
    }

    fn finish(&mut self) {
        self.resolving_depth = None;
    }

    /// Removes the next pending entry owned by one of `owners`.
    pub fn cancel_next_owned_by(&mut self, owners: &[PlayerID]) -> Option<EffectStackEntry> {
        let pos = self.entries.iter().rposition(|entry| owners.contains(&entry.owner))?;
        Some(self.entries.remove(pos))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn record_for_turn(&mut self, turn: u32, entry: EffectStackEntry) {
        self.turn_registry.entry(turn).or_default().push(entry);
    }

    /// "During this turn" effects resolved on `turn`.
    pub fn effects_during_turn(&self, turn: u32) -> &[EffectStackEntry] {
        self.turn_registry.get(&turn).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Forgets registry entries of turns before `current_turn`.
    pub fn cleanup(&mut self, current_turn: u32) -> usize {
        let stale: Vec<u32> = self.turn_registry.range(..current_turn).map(|(turn, _)| *turn).collect();
        stale
            .into_iter()
            .filter_map(|turn| self.turn_registry.remove(&turn))
            .map(|entries| entries.len())
            .sum()
    }
}

impl Game {
    /// Queues a triggered effect. Its conditions and costs are checked
    /// when it resolves.
    pub fn push_effect(
        &mut self,
        source: CardInstanceID,
        owner: PlayerID,
        effect: EffectDefinition,
        target: Option<CardInstanceID>,
    ) -> u64 {
        self.push_stack_entry(source, owner, effect, target, false)
    }

    /// Queues an effect whose costs have already been paid.
    pub fn push_activated_effect(
        &mut self,
        source: CardInstanceID,
        owner: PlayerID,
        effect: EffectDefinition,
        target: Option<CardInstanceID>,
    ) -> u64 {
        self.push_stack_entry(source, owner, effect, target, true)
    }

    fn push_stack_entry(
        &mut self,
        source: CardInstanceID,
        owner: PlayerID,
        effect: EffectDefinition,
        target: Option<CardInstanceID>,
        prepaid: bool,
    ) -> u64 {
        let snapshot = effect.is_continuous().then(|| self.battle_area_snapshot());
        let owner_is_active = self.is_turn_side(owner);
        debug!("stack: push '{}' from {:?} ({:?})", effect.description, source, EffectPriority::of(&effect));
        self.effect_stack
            .push(source, owner, effect, owner_is_active, snapshot, target, prepaid)
    }

    fn battle_area_snapshot(&self) -> Vec<CardInstanceID> {
        self.players
            .iter()
            .flat_map(|player| player.zone(Zone::BattleArea).iter().map(|card| card.id))
            .collect()
    }

    /// Resolves until the stack is empty. An entry that breaks a rule just
    /// fizzles; an integrity failure stops everything.
    pub fn resolve_stack(&mut self) -> EngineResult<Vec<EffectResult>> {
        let mut results = vec![];
        while let Some(mut entry) = self.effect_stack.begin_next() {
            if self.is_game_over() {
                self.effect_stack.clear();
                break;
            }
            match self.resolve_entry(&entry) {
                Ok(result) => results.push(result),
                Err(EngineError::Rule(rule)) => {
                    info!("stack: '{}' fizzled: {}", entry.effect.description, rule);
                }
                Err(e) => {
                    self.effect_stack.finish();
                    error!("stack: '{}' failed: {}", entry.effect.description, e);
                    return Err(e);
                }
            }
            entry.resolved = true;
            if entry.effect.during_this_turn {
                self.effect_stack.record_for_turn(self.turn_number, entry);
            }
        }
        self.effect_stack.finish();
        Ok(results)
    }

    fn resolve_entry(&mut self, entry: &EffectStackEntry) -> EngineResult<EffectResult> {
        let ctx = EffectContext { source: entry.source, controller: entry.owner, target: entry.target };
        if !entry.prepaid {
            if !self.check_conditions(&entry.effect, &ctx) {
                return Err(RuleViolation::ConditionsNotMet.into());
            }
            self.pay_costs(&entry.effect, &ctx)?;
        }
        let result = self.execute_operations(&entry.effect, &ctx, entry.snapshot.as_deref())?;
        info!("stack: resolved '{}'", entry.effect.description);
        self.emit(GameEvent::EffectResolved {
            source: entry.source,
            owner: entry.owner,
            description: entry.effect.description.clone(),
        });
        Ok(result)
    }
}
