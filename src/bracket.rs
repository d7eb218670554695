//! Single-elimination first-round scaffold.
//!
//! Nothing here persists and no rounds advance; the organizer seeds or
//! hand-assigns slots and the view renders the result.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Participant, Team};

/// One competitor in the bracket, either a solo participant or a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entrant {
    pub id: Uuid,
    pub name: String,
    pub rating: i32,
}

impl Entrant {
    pub fn from_participant(p: &Participant) -> Self {
        Entrant {
            id: p.id,
            name: p.name.clone(),
            rating: p.rating,
        }
    }

    pub fn from_team(t: &Team) -> Self {
        Entrant {
            id: t.id,
            name: t.name.clone(),
            rating: t.average_rating,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seeding {
    /// Uniform random shuffle.
    Random,
    /// Descending by rating, names breaking ties.
    ByRating,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    #[error("slot {0} is out of range")]
    SlotOutOfRange(usize),
}

#[derive(Debug, Clone, Default)]
pub struct Bracket {
    slots: Vec<Option<Entrant>>,
}

impl Bracket {
    /// Empty first round sized to the next power of two >= `entrants`.
    pub fn scaffold(entrants: usize) -> Self {
        let size = if entrants == 0 {
            0
        } else {
            entrants.next_power_of_two()
        };
        Bracket {
            slots: vec![None; size],
        }
    }

    /// Scaffold and fill slots in seeded order.
    pub fn seeded<R: Rng>(mut entrants: Vec<Entrant>, seeding: Seeding, rng: &mut R) -> Self {
        match seeding {
            Seeding::Random => entrants.shuffle(rng),
            Seeding::ByRating => {
                entrants.sort_by(|a, b| b.rating.cmp(&a.rating).then(a.name.cmp(&b.name)));
            }
        }
        let mut bracket = Bracket::scaffold(entrants.len());
        for (slot, entrant) in entrants.into_iter().enumerate() {
            bracket.slots[slot] = Some(entrant);
        }
        bracket
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<Entrant>] {
        &self.slots
    }

    /// Manually place an entrant; replaces whatever held the slot.
    pub fn assign(&mut self, slot: usize, entrant: Entrant) -> Result<(), BracketError> {
        let cell = self
            .slots
            .get_mut(slot)
            .ok_or(BracketError::SlotOutOfRange(slot))?;
        *cell = Some(entrant);
        Ok(())
    }

    pub fn clear(&mut self, slot: usize) -> Result<(), BracketError> {
        let cell = self
            .slots
            .get_mut(slot)
            .ok_or(BracketError::SlotOutOfRange(slot))?;
        *cell = None;
        Ok(())
    }

    /// First-round pairings: slot 0 vs 1, 2 vs 3, and so on.
    pub fn pairs(&self) -> Vec<(Option<&Entrant>, Option<&Entrant>)> {
        self.slots
            .chunks(2)
            .map(|pair| (pair[0].as_ref(), pair.get(1).and_then(|e| e.as_ref())))
            .collect()
    }
}
