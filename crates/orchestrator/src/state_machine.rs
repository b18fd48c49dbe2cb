use battle_core::BattlePhase;

use crate::error::{BattleError, Result};

pub struct BattleStateMachine;

impl BattleStateMachine {
    pub fn validate_transition(from: &BattlePhase, to: &BattlePhase) -> Result<()> {
        let allowed = Self::allowed_transitions(from);

        if allowed.contains(to) {
            Ok(())
        } else {
            Err(BattleError::InvalidTransition {
                from: *from,
                to: *to,
            })
        }
    }

    fn allowed_transitions(from: &BattlePhase) -> Vec<BattlePhase> {
        match from {
            BattlePhase::Idle => vec![BattlePhase::TurnStarting],
            BattlePhase::TurnStarting => vec![BattlePhase::AwaitingOutcome],
            BattlePhase::AwaitingOutcome => vec![
                BattlePhase::RunningActions,
                BattlePhase::TurnEnding,
                BattlePhase::TurnStarting,
                BattlePhase::Terminal,
            ],
            BattlePhase::RunningActions => {
                vec![BattlePhase::AwaitingOutcome, BattlePhase::Terminal]
            }
            BattlePhase::TurnEnding => vec![BattlePhase::AwaitingOutcome],
            BattlePhase::Terminal => vec![],
        }
    }

    pub fn can_transition(from: &BattlePhase, to: &BattlePhase) -> bool {
        Self::validate_transition(from, to).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(BattleStateMachine::can_transition(
            &BattlePhase::Idle,
            &BattlePhase::TurnStarting
        ));
        assert!(BattleStateMachine::can_transition(
            &BattlePhase::TurnStarting,
            &BattlePhase::AwaitingOutcome
        ));
        assert!(BattleStateMachine::can_transition(
            &BattlePhase::RunningActions,
            &BattlePhase::AwaitingOutcome
        ));
        assert!(BattleStateMachine::can_transition(
            &BattlePhase::AwaitingOutcome,
            &BattlePhase::TurnStarting
        ));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!BattleStateMachine::can_transition(
            &BattlePhase::Idle,
            &BattlePhase::Terminal
        ));
        assert!(!BattleStateMachine::can_transition(
            &BattlePhase::TurnStarting,
            &BattlePhase::RunningActions
        ));
        assert!(!BattleStateMachine::can_transition(
            &BattlePhase::TurnEnding,
            &BattlePhase::TurnStarting
        ));
    }

    #[test]
    fn test_terminal_is_final() {
        let all = [
            BattlePhase::Idle,
            BattlePhase::TurnStarting,
            BattlePhase::AwaitingOutcome,
            BattlePhase::RunningActions,
            BattlePhase::TurnEnding,
            BattlePhase::Terminal,
        ];
        for to in &all {
            assert!(!BattleStateMachine::can_transition(&BattlePhase::Terminal, to));
        }
    }

    #[test]
    fn test_every_turn_passes_an_outcome_check() {
        // Leaving TurnStarting or TurnEnding always goes through AwaitingOutcome.
        for from in [BattlePhase::TurnStarting, BattlePhase::TurnEnding] {
            let err = BattleStateMachine::validate_transition(&from, &BattlePhase::Terminal)
                .unwrap_err();
            assert!(matches!(err, BattleError::InvalidTransition { .. }));
        }
    }
}
