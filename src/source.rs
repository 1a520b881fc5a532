//! Event sources and the distribution engine.
//!
//! A driver describes its device on a [`SourceBuilder`], then registers it.
//! Registration consumes the builder and yields a shared [`Source`] that has
//! no capability mutators, so the description is frozen from then on.
//!
//! # Locking
//!
//! - `fanout` serializes producers: [`Source::push_event`] holds it across the
//!   state update and the delivery to every client, so all clients observe
//!   one order. Notify callbacks run under it.
//! - `state` guards device state only for the update or a query, so notify
//!   callbacks may read it.
//! - `clients` guards the client set.
//! - `grab` guards the grab holder for the whole read-modify-write over the
//!   client set.
//! - `lifecycle` serializes client registration and disposal so the open and
//!   close hooks see a consistent first/last client.
//!
//! Acquisition order is `lifecycle`, `grab`, `fanout`, `state`, `clients`,
//! then a client's own queue lock.

use crate::bus::{AttachInfo, BusId};
use crate::caps::{Capabilities, RepeatConfig, RepeatMode};
use crate::client::{Client, ClientId};
use crate::codes::{
    Category, EV_REP, EV_SYN, REP_DELAY, REP_PERIOD, SYN_MT_REPORT, SYN_REPORT,
};
use crate::error::{Error, Result};
use crate::event::InputEvent;
use crate::methods::DeviceMethods;
use crate::node::{DeviceNode, NodeProvider};
use crate::queue::DEFAULT_CAPACITY;
use crate::state::{AbsInfo, DeviceState};
use crate::sync::{lock, read, write};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// Pre-registration description of an input device.
pub struct SourceBuilder {
    name: String,
    phys: String,
    serial: String,
    id: BusId,
    attach: Option<AttachInfo>,
    caps: Capabilities,
    absinfo: Vec<AbsInfo>,
    repeat: RepeatConfig,
    methods: Option<Arc<dyn DeviceMethods>>,
    client_capacity: usize,
}

impl SourceBuilder {
    /// Start describing a device called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phys: String::new(),
            serial: String::new(),
            id: BusId::default(),
            attach: None,
            caps: Capabilities::new(),
            absinfo: vec![AbsInfo::default(); Category::Abs.limit() as usize],
            repeat: RepeatConfig::default(),
            methods: None,
            client_capacity: DEFAULT_CAPACITY,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Physical location, e.g. `usb-0000:00:14.0-1/input0`.
    pub fn set_phys(&mut self, phys: impl Into<String>) -> &mut Self {
        self.phys = phys.into();
        self
    }

    pub fn set_serial(&mut self, serial: impl Into<String>) -> &mut Self {
        self.serial = serial.into();
        self
    }

    /// Fix the bus identity. A nonzero bustype survives registration;
    /// otherwise the identity is derived from the attachment.
    pub fn set_id(&mut self, id: BusId) -> &mut Self {
        self.id = id;
        self
    }

    /// Where the device hangs off the bus tree.
    pub fn set_parent(&mut self, attach: AttachInfo) -> &mut Self {
        self.attach = Some(attach);
        self
    }

    pub fn set_methods(&mut self, methods: Arc<dyn DeviceMethods>) -> &mut Self {
        self.methods = Some(methods);
        self
    }

    /// Queue size for clients registered with
    /// [`Source::register_client`].
    pub fn set_client_capacity(&mut self, capacity: usize) -> Result<&mut Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        self.client_capacity = capacity;
        Ok(self)
    }

    pub fn support_event(&mut self, event_type: u16) -> Result<()> {
        self.caps.support(Category::Type, event_type)
    }

    pub fn support_key(&mut self, code: u16) -> Result<()> {
        self.caps.support(Category::Key, code)
    }

    pub fn support_rel(&mut self, code: u16) -> Result<()> {
        self.caps.support(Category::Rel, code)
    }

    pub fn support_abs(&mut self, code: u16) -> Result<()> {
        self.caps.support(Category::Abs, code)
    }

    pub fn support_msc(&mut self, code: u16) -> Result<()> {
        self.caps.support(Category::Msc, code)
    }

    pub fn support_led(&mut self, code: u16) -> Result<()> {
        self.caps.support(Category::Led, code)
    }

    pub fn support_snd(&mut self, code: u16) -> Result<()> {
        self.caps.support(Category::Snd, code)
    }

    pub fn support_sw(&mut self, code: u16) -> Result<()> {
        self.caps.support(Category::Sw, code)
    }

    pub fn support_prop(&mut self, prop: u16) -> Result<()> {
        self.caps.support(Category::Prop, prop)
    }

    /// Declare how the device autorepeats. Any mode other than
    /// [`RepeatMode::NoRepeat`] also declares `EV_REP`.
    pub fn support_repeat(&mut self, mode: RepeatMode) {
        self.repeat.mode = mode;
        if mode != RepeatMode::NoRepeat {
            let declared = self.caps.support(Category::Type, EV_REP);
            debug_assert!(declared.is_ok());
        }
    }

    /// Explicit autorepeat timing in milliseconds.
    pub fn set_repeat_params(&mut self, delay_ms: u32, period_ms: u32) -> &mut Self {
        self.repeat.delay_ms = delay_ms;
        self.repeat.period_ms = period_ms;
        self
    }

    /// Describe absolute axis `axis`. Only the axis index is validated.
    pub fn set_absinfo(&mut self, axis: u16, info: AbsInfo) -> Result<()> {
        let slot = self
            .absinfo
            .get_mut(axis as usize)
            .ok_or_else(|| Error::out_of_range(Category::Abs, axis))?;
        *slot = info;
        Ok(())
    }

    /// Capabilities declared so far.
    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Freeze the description and publish the device.
    ///
    /// Assigns the bus identity, applies default repeat timing and creates the
    /// device node through `nodes`. Fails without side effects if the node
    /// cannot be created.
    pub fn register(self, nodes: Arc<dyn NodeProvider>) -> Result<Arc<Source>> {
        let id = if self.id.bustype != 0 {
            self.id
        } else {
            BusId::classify(self.attach.as_ref().and_then(|a| a.parent.as_ref()))
        };
        let shortname = self
            .attach
            .as_ref()
            .map(|a| a.nameunit.clone())
            .unwrap_or_default();

        let mut repeat = self.repeat;
        repeat.apply_defaults();

        let node = nodes.create(&self.name)?;
        log::info!(
            "registered input source '{}' ({}) at /dev/{} bus={:#x} vendor={:#06x} product={:#06x}",
            self.name,
            shortname,
            node.path,
            id.bustype,
            id.vendor,
            id.product
        );

        Ok(Arc::new(Source {
            name: self.name,
            shortname,
            phys: self.phys,
            serial: self.serial,
            id,
            caps: self.caps,
            client_capacity: self.client_capacity,
            methods: self.methods,
            nodes,
            node: Mutex::new(Some(node)),
            registered: AtomicBool::new(true),
            fanout: Mutex::new(()),
            state: Mutex::new(DeviceState::with_absinfo(self.absinfo)),
            repeat: Mutex::new(repeat),
            clients: RwLock::new(Vec::new()),
            grab: Mutex::new(None),
            lifecycle: Mutex::new(()),
        }))
    }
}

impl fmt::Debug for SourceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceBuilder")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("attach", &self.attach)
            .field("repeat", &self.repeat)
            .finish_non_exhaustive()
    }
}

/// A registered input device.
pub struct Source {
    name: String,
    shortname: String,
    phys: String,
    serial: String,
    id: BusId,
    caps: Capabilities,
    client_capacity: usize,
    methods: Option<Arc<dyn DeviceMethods>>,
    nodes: Arc<dyn NodeProvider>,
    node: Mutex<Option<DeviceNode>>,
    registered: AtomicBool,
    fanout: Mutex<()>,
    state: Mutex<DeviceState>,
    repeat: Mutex<RepeatConfig>,
    clients: RwLock<Vec<Arc<Client>>>,
    grab: Mutex<Option<ClientId>>,
    lifecycle: Mutex<()>,
}

impl Source {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name and unit of the attaching driver, empty when registered without
    /// a parent.
    pub fn shortname(&self) -> &str {
        &self.shortname
    }

    pub fn phys(&self) -> &str {
        &self.phys
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn id(&self) -> BusId {
        self.id
    }

    /// The device node, until unregistration.
    pub fn node(&self) -> Option<DeviceNode> {
        lock(&self.node).clone()
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    pub fn supports(&self, category: Category, code: u16) -> bool {
        self.caps.supports(category, code)
    }

    /// Copy of the current key/LED/sound/switch/axis state.
    pub fn state(&self) -> DeviceState {
        lock(&self.state).clone()
    }

    pub fn key_state(&self, code: u16) -> bool {
        lock(&self.state).key(code)
    }

    pub fn led_state(&self, code: u16) -> bool {
        lock(&self.state).led(code)
    }

    pub fn sound_state(&self, code: u16) -> bool {
        lock(&self.state).sound(code)
    }

    pub fn switch_state(&self, code: u16) -> bool {
        lock(&self.state).switch(code)
    }

    /// Axis descriptor with the last reported value.
    pub fn abs_info(&self, axis: u16) -> Option<AbsInfo> {
        lock(&self.state).abs_info(axis)
    }

    pub fn repeat(&self) -> RepeatConfig {
        *lock(&self.repeat)
    }

    /// Change one autorepeat parameter (`REP_DELAY` or `REP_PERIOD`).
    pub fn set_repeat_param(&self, property: u16, value_ms: u32) -> Result<()> {
        let mut repeat = lock(&self.repeat);
        match property {
            REP_DELAY => repeat.delay_ms = value_ms,
            REP_PERIOD => repeat.period_ms = value_ms,
            _ => return Err(Error::out_of_range(Category::Rep, property)),
        }
        Ok(())
    }

    /// Whether a client holds the exclusive grab.
    pub fn is_grabbed(&self) -> bool {
        lock(&self.grab).is_some()
    }

    /// The client holding the exclusive grab.
    pub fn grabber(&self) -> Option<ClientId> {
        *lock(&self.grab)
    }

    pub fn client_count(&self) -> usize {
        read(&self.clients).len()
    }

    /// Handles to every attached client.
    pub fn clients(&self) -> Vec<Arc<Client>> {
        read(&self.clients).clone()
    }

    /// Accept one event from the driver: validate it, update device state
    /// and deliver it to every attached client.
    ///
    /// Client overflow is absorbed by the client's queue and never reported
    /// here.
    pub fn push_event(&self, event_type: u16, code: u16, value: i32) -> Result<()> {
        let category =
            Category::for_pushed_type(event_type).ok_or(Error::InvalidEventType(event_type))?;
        if !category.contains(code) {
            return Err(Error::out_of_range(category, code));
        }
        if !self.is_registered() {
            return Err(Error::Unregistered);
        }

        let _order = lock(&self.fanout);
        let event = InputEvent::new(event_type, code, value);
        lock(&self.state).apply(&event);

        let clients = read(&self.clients).clone();
        for client in &clients {
            client.deliver(event);
        }
        Ok(())
    }

    /// End of a coherent group of events.
    pub fn sync(&self) -> Result<()> {
        self.push_event(EV_SYN, SYN_REPORT, 1)
    }

    /// End of one multi-touch contact's report.
    pub fn mt_sync(&self) -> Result<()> {
        self.push_event(EV_SYN, SYN_MT_REPORT, 1)
    }

    /// Hand an event from the consumer side to the driver's `event` hook.
    /// Device state and clients are not touched.
    pub fn inject_event(&self, event_type: u16, code: u16, value: i32) -> Result<()> {
        if let Some(methods) = &self.methods {
            methods.event(self, event_type, code, value);
        }
        Ok(())
    }

    /// Attach a client with the source's default queue size.
    pub fn register_client(self: &Arc<Self>) -> Result<Arc<Client>> {
        self.register_client_with_capacity(self.client_capacity)
    }

    /// Attach a client whose queue holds `capacity` events.
    ///
    /// The client starts enabled even if another client currently holds the
    /// grab. The first client triggers the driver's `open` hook; if that
    /// fails, the client is not attached.
    pub fn register_client_with_capacity(self: &Arc<Self>, capacity: usize) -> Result<Arc<Client>> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }
        if !self.is_registered() {
            return Err(Error::Unregistered);
        }

        let _lifecycle = lock(&self.lifecycle);
        let client = Arc::new(Client::new(Arc::downgrade(self), capacity));

        let first = read(&self.clients).is_empty();
        if first
            && let Some(methods) = &self.methods
            && let Err(e) = methods.open(self)
        {
            log::warn!("input source '{}': open failed: {}", self.name, e);
            return Err(match e {
                e @ Error::DeviceOpen(_) => e,
                other => Error::DeviceOpen(other.to_string()),
            });
        }

        write(&self.clients).push(client.clone());
        log::debug!(
            "input source '{}': client {} attached (capacity {})",
            self.name,
            client.id(),
            capacity
        );
        Ok(client)
    }

    /// Detach `client`, releasing its grab if it holds one. The last client
    /// triggers the driver's `close` hook.
    pub fn dispose_client(&self, client: &Client) -> Result<()> {
        let _lifecycle = lock(&self.lifecycle);
        let remaining = {
            let mut holder = lock(&self.grab);
            let mut clients = write(&self.clients);
            let pos = clients
                .iter()
                .position(|c| c.id() == client.id())
                .ok_or(Error::UnknownClient(client.id()))?;
            clients.remove(pos);

            if *holder == Some(client.id()) {
                *holder = None;
                clients.iter().for_each(|c| c.set_enabled(true));
                log::debug!(
                    "input source '{}': grab released by disposal of client {}",
                    self.name,
                    client.id()
                );
            }
            clients.len()
        };

        client.detach();
        log::debug!(
            "input source '{}': client {} disposed, {} remaining",
            self.name,
            client.id(),
            remaining
        );

        if remaining == 0
            && let Some(methods) = &self.methods
        {
            methods.close(self);
        }
        Ok(())
    }

    /// Give `client` exclusive access, muting every other attached client.
    pub fn grab(&self, client: &Client) -> Result<()> {
        let mut holder = lock(&self.grab);
        if holder.is_some() {
            return Err(Error::Busy);
        }

        let clients = read(&self.clients);
        if !clients.iter().any(|c| c.id() == client.id()) {
            return Err(Error::UnknownClient(client.id()));
        }
        *holder = Some(client.id());
        clients
            .iter()
            .filter(|c| c.id() != client.id())
            .for_each(|c| c.set_enabled(false));

        log::debug!("input source '{}': grabbed by client {}", self.name, client.id());
        Ok(())
    }

    /// End `client`'s exclusive access and re-enable its siblings.
    pub fn release(&self, client: &Client) -> Result<()> {
        let mut holder = lock(&self.grab);
        if *holder != Some(client.id()) {
            return Err(Error::NotGrabbed);
        }

        *holder = None;
        read(&self.clients)
            .iter()
            .filter(|c| c.id() != client.id())
            .for_each(|c| c.set_enabled(true));

        log::debug!("input source '{}': released by client {}", self.name, client.id());
        Ok(())
    }

    /// Withdraw the device node. Clients should be disposed first; any that
    /// remain keep their queued events but receive nothing further.
    pub fn unregister(&self) -> Result<()> {
        if !self.registered.swap(false, Ordering::AcqRel) {
            return Err(Error::Unregistered);
        }

        let attached = self.client_count();
        if attached > 0 {
            log::warn!(
                "input source '{}' unregistered with {} client(s) still attached",
                self.name,
                attached
            );
        }

        if let Some(node) = lock(&self.node).take() {
            self.nodes.destroy(&node);
            log::info!(
                "unregistered input source '{}' from /dev/{}",
                self.name,
                node.path
            );
        }
        Ok(())
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source")
            .field("name", &self.name)
            .field("shortname", &self.shortname)
            .field("id", &self.id)
            .field("node", &self.node())
            .field("clients", &self.client_count())
            .field("grabber", &self.grabber())
            .finish()
    }
}
