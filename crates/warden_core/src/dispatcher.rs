//! Composition root: detects the Tier once, builds the matching capability
//! bundle, and routes platform events and ticks into the task registry and
//! freeze controller.

use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bundle::CapabilityBundle;
use crate::condition::{derive_rule, eligible};
use crate::effects::{self, Services};
use crate::tasks::TaskRegistry;
use crate::{
    capability, Config, DestinationStore, DispatchError, EntityId, EntityRef, EquipmentSlot,
    EventOutcome, FreezeController, Host, Material, NotifyKind, PlatformEvent, Rejection,
    TaskFault, TaskKey, TaskKind, Tier,
};

pub struct Dispatcher<H: Host + 'static> {
    pub(crate) bundle: CapabilityBundle,
    pub(crate) registry: TaskRegistry<Services<H>>,
    pub(crate) services: Services<H>,
    pub(crate) destinations: DestinationStore,
    /// Entities whose equipment must be re-read at the start of next tick.
    pending: IndexSet<EntityId>,
    release_notice: Option<String>,
    pub(crate) rng: StdRng,
    pub(crate) tick: u64,
}

impl<H: Host + 'static> Dispatcher<H> {
    /// Detect the Tier from `version`, select its bundle, and take ownership
    /// of the host. Entities already online are set up immediately.
    pub fn initialize(
        version: &str,
        config: Config,
        host: H,
        destinations: DestinationStore,
    ) -> Result<Self, DispatchError> {
        let tier = capability::detect(version);
        let bundle = CapabilityBundle::select(tier, &config)?;
        tracing::info!(
            version,
            ?tier,
            equipment = ?bundle.equipment,
            movement = ?bundle.movement,
            "capability bundle selected"
        );

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let rule = derive_rule(&config, tier);

        let mut dispatcher = Self {
            bundle,
            registry: TaskRegistry::new(),
            services: Services {
                host,
                freeze: FreezeController::new(),
                rule,
                config,
            },
            destinations,
            pending: IndexSet::new(),
            release_notice: None,
            rng,
            tick: 0,
        };
        for entity in dispatcher.services.host.online() {
            dispatcher.on_join(&entity);
        }
        Ok(dispatcher)
    }

    pub fn tier(&self) -> Tier {
        self.bundle.tier
    }

    pub fn bundle(&self) -> &CapabilityBundle {
        &self.bundle
    }

    pub fn config(&self) -> &Config {
        &self.services.config
    }

    pub fn host(&self) -> &H {
        &self.services.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.services.host
    }

    pub fn destinations(&self) -> &DestinationStore {
        &self.destinations
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn is_active(&self, entity: EntityId, kind: TaskKind) -> bool {
        self.registry.is_active(TaskKey::new(entity, kind))
    }

    pub fn active_tasks(&self, kind: TaskKind) -> usize {
        self.registry.count_kind(kind)
    }

    pub fn is_frozen(&self, entity: EntityId) -> bool {
        self.services.freeze.is_frozen(entity)
    }

    pub fn freeze(&self) -> &FreezeController {
        &self.services.freeze
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Route one host event. Shapes the active bundle does not subscribe to
    /// are let through untouched.
    pub fn handle_event(&mut self, event: &PlatformEvent) -> EventOutcome {
        if !self.bundle.subscribes(event.shape()) {
            tracing::trace!(
                shape = ?event.shape(),
                tier = ?self.bundle.tier,
                "event shape not subscribed"
            );
            return EventOutcome::Allow;
        }

        match event {
            PlatformEvent::Join { entity } => {
                self.on_join(entity);
                EventOutcome::Allow
            }
            PlatformEvent::Quit { entity } => {
                self.on_quit(*entity);
                EventOutcome::Allow
            }
            PlatformEvent::Move { entity, from, to } => self
                .services
                .freeze
                .suppress_move(*entity, from, to, self.bundle.movement)
                .unwrap_or(EventOutcome::Allow),
            PlatformEvent::Interact { entity } | PlatformEvent::DropItem { entity } => {
                if self.is_frozen(*entity) {
                    EventOutcome::Cancel
                } else {
                    EventOutcome::Allow
                }
            }
            PlatformEvent::CommandIssued { entity, .. } => self.on_command(*entity),
            PlatformEvent::Chat { entity, .. } => self.on_chat(*entity),
            PlatformEvent::InventoryClick { entity } => {
                self.pending.insert(*entity);
                EventOutcome::Allow
            }
            PlatformEvent::ArmorChange {
                entity,
                slot,
                material,
            }
            | PlatformEvent::EquipmentChange {
                entity,
                slot,
                material,
            } => {
                self.on_slot_change(*entity, *slot, material.clone());
                EventOutcome::Allow
            }
        }
    }

    fn on_join(&mut self, entity: &EntityRef) {
        if self.services.config.roster_hidden {
            self.start_roster_hide(entity.id);
        }
        self.evaluate_equipment(entity.id);

        if let Some(notice) = &self.release_notice {
            let permission = &self.services.config.update_notify_permission;
            if self.services.host.has_permission(entity.id, permission) {
                self.services
                    .host
                    .notify(entity.id, notice, NotifyKind::Info);
            }
        }
    }

    fn on_quit(&mut self, entity: EntityId) {
        let cancelled = self.registry.cancel_entity(entity, &mut self.services);
        self.services.freeze.release(entity);
        self.pending.shift_remove(&entity);
        tracing::debug!(%entity, cancelled, "entity disconnected");
    }

    fn on_command(&mut self, entity: EntityId) -> EventOutcome {
        if !self.is_frozen(entity) {
            return EventOutcome::Allow;
        }
        self.services.host.notify(
            entity,
            "You cannot use commands during a teleport countdown.",
            NotifyKind::Warning,
        );
        EventOutcome::Cancel
    }

    fn on_chat(&mut self, entity: EntityId) -> EventOutcome {
        let config = &self.services.config;
        if !config.chat_restricted
            || self
                .services
                .host
                .has_permission(entity, &config.chat_bypass_permission)
        {
            return EventOutcome::Allow;
        }
        self.services
            .host
            .notify(entity, "Chat is currently restricted.", NotifyKind::Warning);
        EventOutcome::Cancel
    }

    fn on_slot_change(
        &mut self,
        entity: EntityId,
        slot: EquipmentSlot,
        material: Option<Material>,
    ) {
        if !self.equipment_active() {
            return;
        }
        let snapshot = self
            .services
            .host
            .equipment(entity)
            .unwrap_or_default()
            .with_slot(slot, material);
        let qualifies = eligible(&snapshot, &self.services.rule);
        self.apply_eligibility(entity, qualifies);
    }

    // -----------------------------------------------------------------------
    // Equipment and roster tasks
    // -----------------------------------------------------------------------

    fn equipment_active(&self) -> bool {
        self.bundle.equipment != crate::EquipmentSignal::Disabled
            && self.services.config.equipment_effect_enabled
    }

    pub(crate) fn evaluate_equipment(&mut self, entity: EntityId) {
        let qualifies = self.equipment_active()
            && self
                .services
                .host
                .equipment(entity)
                .is_some_and(|snapshot| eligible(&snapshot, &self.services.rule));
        self.apply_eligibility(entity, qualifies);
    }

    fn apply_eligibility(&mut self, entity: EntityId, qualifies: bool) {
        let key = TaskKey::new(entity, TaskKind::EquipmentEffect);
        if qualifies {
            // Already running is fine: the existing schedule continues.
            match self.registry.start(
                key,
                self.services.rule.interval_ticks,
                effects::equipment_damage(),
                effects::equipment_stopped(),
            ) {
                Ok(()) | Err(Rejection::DuplicateTask(_)) => {}
                Err(rejection) => {
                    tracing::warn!(%entity, %rejection, "equipment effect not started");
                }
            }
        } else {
            self.registry.cancel(key, &mut self.services);
        }
    }

    pub(crate) fn start_roster_hide(&mut self, entity: EntityId) {
        let key = TaskKey::new(entity, TaskKind::RosterHide);
        if self.registry.is_active(key) {
            return;
        }
        self.services.host.set_roster_hidden(entity, true);
        if let Err(rejection) = self.registry.start(
            key,
            self.services.config.roster_refresh_ticks,
            effects::roster_hide(),
            effects::roster_restore(),
        ) {
            tracing::warn!(%entity, %rejection, "roster hiding not started");
        }
    }

    pub(crate) fn stop_roster_hide(&mut self, entity: EntityId) {
        self.registry
            .cancel(TaskKey::new(entity, TaskKind::RosterHide), &mut self.services);
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance one simulation tick.
    ///
    /// Order of operations:
    /// 1. Re-evaluate entities queued by inventory clicks.
    /// 2. Poll every online entity if the bundle polls and the cadence is due.
    /// 3. Fire due tasks.
    /// 4. Increment the tick counter.
    pub fn tick(&mut self) -> Vec<TaskFault> {
        let queued: Vec<EntityId> = self.pending.drain(..).collect();
        for entity in queued {
            if self.services.host.is_online(entity) {
                self.evaluate_equipment(entity);
            }
        }

        let poll_every = u64::from(self.services.config.poll_interval_ticks.max(1));
        if self.bundle.equipment.polls() && self.tick.is_multiple_of(poll_every) {
            for entity in self.services.host.online() {
                self.evaluate_equipment(entity.id);
            }
        }

        let faults = self.registry.tick(&mut self.services);
        self.tick += 1;
        faults
    }

    /// Hand over the result of the release check. Privileged entities
    /// already online are told right away; later joins are told on join.
    pub fn set_release_notice(&mut self, notice: Option<String>) {
        if let Some(message) = &notice {
            let permission = self.services.config.update_notify_permission.clone();
            for entity in self.services.host.online() {
                if self.services.host.has_permission(entity.id, &permission) {
                    self.services
                        .host
                        .notify(entity.id, message, NotifyKind::Info);
                }
            }
        }
        self.release_notice = notice;
    }

    pub fn release_notice(&self) -> Option<&str> {
        self.release_notice.as_deref()
    }

    /// Tear down every task and freeze session. Cancel hooks run, so roster
    /// entries are restored and no pending relocation happens.
    pub fn shutdown(&mut self) {
        let cancelled = self.registry.cancel_all(&mut self.services);
        self.services.freeze.clear();
        self.pending.clear();
        tracing::info!(cancelled, tick = self.tick, "dispatcher shut down");
    }
}
