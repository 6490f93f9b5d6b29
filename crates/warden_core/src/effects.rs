//! Callbacks for the three recurring task families. Each one re-checks its
//! own preconditions on every firing and cancels itself once they fail.

use crate::condition::eligible;
use crate::freeze::StepOutcome;
use crate::tasks::{CancelHook, TaskCallback, TaskControl, TaskResult};
use crate::{Config, EquipmentRule, FreezeController, Host, TaskKey};

/// State the periodic callbacks may touch. Owned by the dispatcher and lent
/// to the registry for the duration of a tick.
#[derive(Debug)]
pub struct Services<H> {
    pub host: H,
    pub freeze: FreezeController,
    pub rule: EquipmentRule,
    pub config: Config,
}

pub(crate) fn equipment_damage<H: Host + 'static>() -> TaskCallback<Services<H>> {
    Box::new(|svc: &mut Services<H>, key: TaskKey| -> TaskResult {
        if !svc.config.equipment_effect_enabled {
            return Ok(TaskControl::Cancel);
        }
        let Some(snapshot) = svc.host.equipment(key.entity) else {
            return Ok(TaskControl::Cancel);
        };
        if !eligible(&snapshot, &svc.rule) {
            return Ok(TaskControl::Cancel);
        }
        let amount = svc.rule.damage;
        if !amount.is_finite() || amount < 0.0 {
            return Err(format!("damage amount {amount} is not applicable"));
        }
        svc.host.damage(key.entity, amount);
        Ok(TaskControl::Continue)
    })
}

pub(crate) fn equipment_stopped<H: Host + 'static>() -> Option<CancelHook<Services<H>>> {
    Some(Box::new(|_: &mut Services<H>, key: TaskKey| {
        tracing::debug!(entity = %key.entity, "equipment effect stopped");
    }))
}

pub(crate) fn roster_hide<H: Host + 'static>() -> TaskCallback<Services<H>> {
    Box::new(|svc: &mut Services<H>, key: TaskKey| -> TaskResult {
        if !svc.config.roster_hidden || !svc.host.is_online(key.entity) {
            return Ok(TaskControl::Cancel);
        }
        svc.host.set_roster_hidden(key.entity, true);
        Ok(TaskControl::Continue)
    })
}

pub(crate) fn roster_restore<H: Host + 'static>() -> Option<CancelHook<Services<H>>> {
    Some(Box::new(|svc: &mut Services<H>, key: TaskKey| {
        if svc.host.is_online(key.entity) {
            svc.host.set_roster_hidden(key.entity, false);
        }
    }))
}

pub(crate) fn countdown_step<H: Host + 'static>() -> TaskCallback<Services<H>> {
    Box::new(|svc: &mut Services<H>, key: TaskKey| -> TaskResult {
        match svc.freeze.step(key.entity, &mut svc.host) {
            StepOutcome::Counting { .. } => Ok(TaskControl::Continue),
            StepOutcome::Released => Ok(TaskControl::Cancel),
        }
    })
}

/// Forced exit from a countdown leaves the entity where it is.
pub(crate) fn countdown_release<H: Host + 'static>() -> Option<CancelHook<Services<H>>> {
    Some(Box::new(|svc: &mut Services<H>, key: TaskKey| {
        svc.freeze.release(key.entity);
    }))
}
