use super::resolver::{resolve, LevelChange, Resolution};
use super::types::*;
use crate::data::{EnhancementInfo, WeaponFamily};
use rand::Rng;

/// Run one enhancement attempt toward `current_level + 1`.
///
/// Returns `None` when `info` has no record for the requested kind; the
/// caller must treat that as terminal for the current operation. Nothing
/// is applied here; the caller owns level, ledger and history.
pub fn attempt_enhancement<R: Rng + ?Sized>(
    kind: AttemptKind,
    info: &EnhancementInfo<'_>,
    options: ProtectionOptions,
    current_level: u32,
    family: &WeaponFamily,
    rng: &mut R,
) -> Option<EnhancementResult> {
    match kind {
        AttemptKind::Guaranteed => {
            let record = info.guaranteed?;
            Some(EnhancementResult {
                kind,
                from_level: current_level,
                new_level: current_level + 1,
                outcome: Outcome::GuaranteedSuccess,
                costs: record.costs(),
                consumed_weapon: None,
            })
        }
        AttemptKind::Probabilistic => {
            let record = info.probabilistic?;
            let resolution = resolve(record, options, rng);
            Some(result_from_resolution(
                resolution,
                current_level,
                family,
            ))
        }
    }
}

fn result_from_resolution(
    resolution: Resolution,
    current_level: u32,
    family: &WeaponFamily,
) -> EnhancementResult {
    let outcome = match resolution.change {
        LevelChange::Up => Outcome::Success,
        LevelChange::Stay if resolution.reset_prevented => Outcome::ResetPrevented,
        LevelChange::Stay => Outcome::Failure,
        LevelChange::Down => Outcome::Downgrade,
        LevelChange::ToZero => Outcome::Reset,
    };
    EnhancementResult {
        kind: AttemptKind::Probabilistic,
        from_level: current_level,
        new_level: resolution.change.apply(current_level),
        outcome,
        costs: resolution.costs,
        consumed_weapon: resolution
            .reset_prevented
            .then(|| family.name().to_string()),
    }
}

/// Path the autoplay loop takes toward `next_level`, if any.
///
/// Guaranteed wins when it exists and the level is marked as preferred;
/// otherwise probabilistic, then guaranteed as a fallback.
pub fn choose_attempt_kind(info: &EnhancementInfo<'_>, prefer_guaranteed: bool) -> Option<AttemptKind> {
    if info.guaranteed.is_some() && prefer_guaranteed {
        Some(AttemptKind::Guaranteed)
    } else if info.probabilistic.is_some() {
        Some(AttemptKind::Probabilistic)
    } else if info.guaranteed.is_some() {
        Some(AttemptKind::Guaranteed)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{EnhancementCostRecord, ProbabilisticCostRecord, WeaponVariant};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn family() -> WeaponFamily {
        WeaponFamily::new(vec![WeaponVariant {
            name: "Halberd".to_string(),
            grade: "Epic".to_string(),
            level: 0,
        }])
        .unwrap()
    }

    fn guaranteed() -> EnhancementCostRecord {
        EnhancementCostRecord {
            grade: "Epic".to_string(),
            level: 3,
            gold: 250,
            shard: 4,
            stone: 1,
        }
    }

    fn always_reset() -> ProbabilisticCostRecord {
        ProbabilisticCostRecord {
            grade: "Epic".to_string(),
            level: 3,
            success: 0.0,
            failure: 0.0,
            downgrade: 0.0,
            reset: 1.0,
            gold: 10,
            shard: 0,
            stone: 0,
            downgrade_protection_cost: 0,
            reset_protection_cost: 5,
        }
    }

    #[test]
    fn test_guaranteed_is_deterministic() {
        let g = guaranteed();
        let info = EnhancementInfo {
            guaranteed: Some(&g),
            probabilistic: None,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let first =
            attempt_enhancement(AttemptKind::Guaranteed, &info, ProtectionOptions::NONE, 2, &family(), &mut rng)
                .unwrap();
        for _ in 0..50 {
            let again = attempt_enhancement(
                AttemptKind::Guaranteed,
                &info,
                ProtectionOptions::both(),
                2,
                &family(),
                &mut rng,
            )
            .unwrap();
            assert_eq!(again, first);
        }
        assert_eq!(first.new_level, 3);
        assert_eq!(first.outcome, Outcome::GuaranteedSuccess);
        assert_eq!(first.costs, MaterialCosts::new(250, 4, 1));
    }

    #[test]
    fn test_missing_record_returns_none() {
        let g = guaranteed();
        let only_guaranteed = EnhancementInfo {
            guaranteed: Some(&g),
            probabilistic: None,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(attempt_enhancement(
            AttemptKind::Probabilistic,
            &only_guaranteed,
            ProtectionOptions::NONE,
            2,
            &family(),
            &mut rng
        )
        .is_none());

        let empty = EnhancementInfo::default();
        for kind in [AttemptKind::Guaranteed, AttemptKind::Probabilistic] {
            assert!(
                attempt_enhancement(kind, &empty, ProtectionOptions::NONE, 2, &family(), &mut rng)
                    .is_none()
            );
        }
    }

    #[test]
    fn test_prevented_reset_consumes_selected_weapon() {
        let p = always_reset();
        let info = EnhancementInfo {
            guaranteed: None,
            probabilistic: Some(&p),
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let result = attempt_enhancement(
            AttemptKind::Probabilistic,
            &info,
            ProtectionOptions::reset(),
            2,
            &family(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(result.outcome, Outcome::ResetPrevented);
        assert_eq!(result.new_level, 2);
        assert_eq!(result.consumed_weapon.as_deref(), Some("Halberd"));
        assert_eq!(result.costs.gold, 15);
        assert_eq!(result.message(), "[+2 → +2] reset (prevented)");
    }

    #[test]
    fn test_choose_attempt_kind() {
        let g = guaranteed();
        let p = always_reset();
        let both = EnhancementInfo {
            guaranteed: Some(&g),
            probabilistic: Some(&p),
        };
        assert_eq!(choose_attempt_kind(&both, true), Some(AttemptKind::Guaranteed));
        assert_eq!(choose_attempt_kind(&both, false), Some(AttemptKind::Probabilistic));

        let only_g = EnhancementInfo {
            guaranteed: Some(&g),
            probabilistic: None,
        };
        assert_eq!(choose_attempt_kind(&only_g, false), Some(AttemptKind::Guaranteed));

        let only_p = EnhancementInfo {
            guaranteed: None,
            probabilistic: Some(&p),
        };
        assert_eq!(choose_attempt_kind(&only_p, true), Some(AttemptKind::Probabilistic));
        assert_eq!(choose_attempt_kind(&EnhancementInfo::default(), true), None);
    }
}
