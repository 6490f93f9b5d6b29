//! Administrative operations exposed to the command layer.

use crate::condition::derive_rule;
use crate::destination::resolve;
use crate::effects;
use crate::{
    AdminCommand, CommandOutcome, Config, Destination, DestinationPolicy, Dispatcher, EntityId,
    Host, Location, NotifyKind, Rejection, TaskKey, TaskKind,
};

impl<H: Host + 'static> Dispatcher<H> {
    /// Apply one administrative command.
    pub fn apply(&mut self, command: AdminCommand) -> CommandOutcome {
        let outcome = match command {
            AdminCommand::RequestCountdownTeleport {
                entity,
                destination,
            } => self
                .request_countdown_teleport(entity, destination)
                .map(|()| CommandOutcome::Accepted),
            AdminCommand::CancelFreeze { entity } => {
                Ok(CommandOutcome::FreezeCancelled(self.cancel_freeze(entity)))
            }
            AdminCommand::RefreshEquipmentTasks => Ok(CommandOutcome::Refreshed {
                active: self.refresh_equipment_tasks(),
            }),
            AdminCommand::ResolveAndTeleport {
                entity,
                owner,
                policy,
            } => self
                .teleport_to_owner(entity, &owner, policy)
                .map(CommandOutcome::Resolved),
            AdminCommand::Reload { config } => {
                self.reload(*config);
                Ok(CommandOutcome::Accepted)
            }
        };
        outcome.unwrap_or_else(|rejection| {
            tracing::debug!(%rejection, "admin command rejected");
            CommandOutcome::Rejected(rejection)
        })
    }

    /// Freeze `entity`, count down, and relocate it to `destination` at the
    /// configured instant. With countdowns disabled the relocation is
    /// immediate.
    pub fn request_countdown_teleport(
        &mut self,
        entity: EntityId,
        destination: Location,
    ) -> Result<(), Rejection> {
        if !self.services.host.is_online(entity) {
            return Err(Rejection::UnknownEntity(entity));
        }
        if self.services.freeze.is_frozen(entity) {
            return Err(Rejection::AlreadyFrozen(entity));
        }
        if !self.services.config.countdown_enabled {
            self.services.host.teleport(entity, &destination);
            self.services
                .host
                .notify(entity, "Teleported.", NotifyKind::Info);
            return Ok(());
        }

        let config = &self.services.config;
        let (duration, step, timing) = (
            config.countdown_duration_ticks,
            config.countdown_step_ticks.max(1),
            config.teleport_timing,
        );
        let anchor = self.services.host.position(entity);
        self.services
            .freeze
            .begin(entity, destination, duration, step, timing, self.tick, anchor)?;

        let key = TaskKey::new(entity, TaskKind::FreezeCountdown);
        if let Err(rejection) = self.registry.start(
            key,
            1,
            effects::countdown_step(),
            effects::countdown_release(),
        ) {
            self.services.freeze.release(entity);
            return Err(rejection);
        }
        self.services.host.notify(
            entity,
            "Teleport countdown started. Do not move.",
            NotifyKind::Info,
        );
        Ok(())
    }

    /// Stop a countdown early. The entity stays where it is and gets no
    /// terminal feedback. Returns false if nothing was counting.
    pub fn cancel_freeze(&mut self, entity: EntityId) -> bool {
        let key = TaskKey::new(entity, TaskKind::FreezeCountdown);
        let had_task = self.registry.cancel(key, &mut self.services);
        let had_session = self.services.freeze.release(entity).is_some();
        had_task || had_session
    }

    /// Re-evaluate every online entity. Returns the number of active
    /// equipment tasks afterwards.
    pub fn refresh_equipment_tasks(&mut self) -> usize {
        for entity in self.services.host.online() {
            self.evaluate_equipment(entity.id);
        }
        self.registry.count_kind(TaskKind::EquipmentEffect)
    }

    /// Pick one of `candidates` with `policy` and start a countdown teleport
    /// to it.
    pub fn resolve_and_teleport(
        &mut self,
        entity: EntityId,
        candidates: &[Destination],
        policy: DestinationPolicy,
    ) -> Result<Destination, Rejection> {
        let chosen = resolve(candidates, policy, &mut self.rng)
            .cloned()
            .ok_or(Rejection::EmptyCandidates)?;
        self.request_countdown_teleport(entity, chosen.location.clone())?;
        Ok(chosen)
    }

    /// Route `entity` to one of the stored destinations owned by `owner`,
    /// using `policy` or the configured default.
    pub fn teleport_to_owner(
        &mut self,
        entity: EntityId,
        owner: &str,
        policy: Option<DestinationPolicy>,
    ) -> Result<Destination, Rejection> {
        let candidates = self.destinations.candidates_for(owner);
        if candidates.is_empty() {
            return Err(Rejection::NoCandidates(owner.to_string()));
        }
        let policy = policy.unwrap_or(self.services.config.multi_destination_policy);
        self.resolve_and_teleport(entity, &candidates, policy)
    }

    pub fn add_destination(&mut self, destination: Destination) -> Result<(), Rejection> {
        self.destinations.insert(destination)
    }

    pub fn remove_destination(&mut self, name: &str) -> Result<Destination, Rejection> {
        self.destinations.remove(name)
    }

    /// Swap in a new configuration snapshot.
    ///
    /// The capability bundle stays as selected at startup; toggles that
    /// would change it are logged and take effect on the next start.
    pub fn reload(&mut self, config: Config) {
        let previous = &self.services.config;
        if previous.include_auxiliary != config.include_auxiliary
            || previous.equipment_effect_enabled != config.equipment_effect_enabled
        {
            tracing::warn!(
                tier = ?self.bundle.tier,
                "equipment tracking mode changed; the new mode applies after restart"
            );
        }

        let reschedule_equipment = previous.damage_interval_ticks != config.damage_interval_ticks;
        let reschedule_roster = previous.roster_refresh_ticks != config.roster_refresh_ticks;

        self.services.rule = derive_rule(&config, self.bundle.tier);
        self.services.config = config;

        if reschedule_equipment {
            self.registry
                .cancel_kind(TaskKind::EquipmentEffect, &mut self.services);
        }
        if reschedule_roster {
            self.registry
                .cancel_kind(TaskKind::RosterHide, &mut self.services);
        }

        for entity in self.services.host.online() {
            if self.services.config.roster_hidden {
                self.start_roster_hide(entity.id);
            } else {
                self.stop_roster_hide(entity.id);
            }
            self.evaluate_equipment(entity.id);
        }
        tracing::info!(tick = self.tick, "configuration reloaded");
    }
}
