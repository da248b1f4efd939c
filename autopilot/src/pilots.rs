use flappy_core::bird::Bird;

use crate::lineage::{Action, Lineage};

/// Drives one lineage's bird. Every pilot owns a [`Lineage`] so the trainer
/// can run the same end-of-run bookkeeping for all of them.
pub trait Pilot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn lineage(&self) -> &Lineage;
    fn lineage_mut(&mut self) -> &mut Lineage;
    fn next_action(&mut self, _bird: &Bird) -> Action {
        self.lineage_mut().play()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PilotKind {
    HillClimber,
    Glider,
    Flapper,
}

#[derive(Clone, Copy, Debug)]
struct PilotConfig {
    id: &'static str,
    description: &'static str,
    kind: PilotKind,
}

fn pilot_configs() -> &'static [PilotConfig] {
    &[
        PilotConfig {
            id: "hill-climber",
            description: "Replays its best run up to the last point scored, mutates the tail by death cause.",
            kind: PilotKind::HillClimber,
        },
        PilotConfig {
            id: "glider",
            description: "Never ascends. Baseline that falls off the bottom.",
            kind: PilotKind::Glider,
        },
        PilotConfig {
            id: "flapper",
            description: "Ascends again as soon as each climb finishes. Leaves through the top.",
            kind: PilotKind::Flapper,
        },
    ]
}

pub struct HillClimber {
    cfg: PilotConfig,
    lineage: Lineage,
}

impl Pilot for HillClimber {
    fn id(&self) -> &'static str {
        self.cfg.id
    }

    fn description(&self) -> &'static str {
        self.cfg.description
    }

    fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    fn lineage_mut(&mut self) -> &mut Lineage {
        &mut self.lineage
    }
}

/// Fixed-behaviour baseline. The lineage still advances every tick, its
/// choice is just ignored.
pub struct FixedPilot {
    cfg: PilotConfig,
    lineage: Lineage,
}

impl Pilot for FixedPilot {
    fn id(&self) -> &'static str {
        self.cfg.id
    }

    fn description(&self) -> &'static str {
        self.cfg.description
    }

    fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    fn lineage_mut(&mut self) -> &mut Lineage {
        &mut self.lineage
    }

    fn next_action(&mut self, bird: &Bird) -> Action {
        self.lineage.play();
        match self.cfg.kind {
            PilotKind::Flapper if !bird.is_climbing() => Action::Ascend,
            _ => Action::Glide,
        }
    }
}

pub fn pilot_ids() -> Vec<&'static str> {
    pilot_configs().iter().map(|cfg| cfg.id).collect()
}

pub fn describe_pilots() -> Vec<(&'static str, &'static str)> {
    pilot_configs()
        .iter()
        .map(|cfg| (cfg.id, cfg.description))
        .collect()
}

pub fn create_pilot(id: &str, seed: u32) -> Option<Box<dyn Pilot>> {
    let cfg = *pilot_configs().iter().find(|cfg| cfg.id == id)?;
    let lineage = Lineage::new(seed);
    let pilot: Box<dyn Pilot> = match cfg.kind {
        PilotKind::HillClimber => Box::new(HillClimber { cfg, lineage }),
        PilotKind::Glider | PilotKind::Flapper => Box::new(FixedPilot { cfg, lineage }),
    };
    Some(pilot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_core::constants::BIRD_X;

    #[test]
    fn roster_ids_resolve() {
        for id in pilot_ids() {
            let pilot = create_pilot(id, 1).expect("listed pilot");
            assert_eq!(pilot.id(), id);
            assert!(!pilot.description().is_empty());
        }
        assert!(create_pilot("autopilot-9000", 1).is_none());
        assert_eq!(describe_pilots().len(), pilot_ids().len());
    }

    #[test]
    fn fixed_pilots_still_advance_their_lineage() {
        let sinking = Bird::new(BIRD_X, 200.0, 0.0);
        let climbing = Bird::new(BIRD_X, 200.0, 100.0);

        let mut glider = create_pilot("glider", 4).expect("glider");
        let mut flapper = create_pilot("flapper", 4).expect("flapper");
        for _ in 0..10 {
            assert_eq!(glider.next_action(&sinking), Action::Glide);
        }
        assert_eq!(flapper.next_action(&sinking), Action::Ascend);
        assert_eq!(flapper.next_action(&climbing), Action::Glide);

        assert_eq!(glider.lineage().cursor(), 12);
        assert_eq!(flapper.lineage().cursor(), 4);
    }

    #[test]
    fn hill_climber_follows_its_lineage() {
        let bird = Bird::spawn();
        let mut pilot = create_pilot("hill-climber", 8).expect("hill climber");
        let mut twin = Lineage::new(8);
        for _ in 0..200 {
            assert_eq!(pilot.next_action(&bird), twin.play());
        }
    }
}
