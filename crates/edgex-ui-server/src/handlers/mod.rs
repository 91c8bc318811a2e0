//! Query and mutation handlers backing the management UI.
//!
//! Every operation the client issues is listed in [`QueryOp`] or
//! [`MutationOp`]; [`registry`] registers one handler per entry. Handlers
//! call the EdgeX services through [`Services`] and reshape the JSON they
//! get back into keyword-keyed records tagged with a `:type`.

mod addressables;
mod auth;
mod commands;
mod context;
mod devices;
mod exports;
mod logs;
mod metadata;
mod notifications;
mod profiles;
mod readings;
mod reshape;
mod schedules;
mod settings;

use std::sync::Arc;

use async_trait::async_trait;
use edgex_transit::{Keyword, Symbol, Value};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::dispatch::{Args, HandlerError, MutationHandler, QueryHandler, Registry};

pub use context::Services;

pub(crate) const HANDLERS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::handlers");

/// Namespace of every mutation symbol the client sends.
pub const MUTATION_NAMESPACE: &str = "org.edgexfoundry.ui.manager.api.mutations";

/// Query keys served by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum QueryOp {
    /// Devices with profile details stripped.
    #[strum(serialize = "q/edgex-devices")]
    Devices,
    /// Device services.
    #[strum(serialize = "q/edgex-device-services")]
    DeviceServices,
    /// Schedule events.
    #[strum(serialize = "q/edgex-schedule-events")]
    ScheduleEvents,
    /// Addressables.
    #[strum(serialize = "q/edgex-addressables")]
    Addressables,
    /// Device profiles.
    #[strum(serialize = "q/edgex-profiles")]
    Profiles,
    /// YAML source of one profile.
    #[strum(serialize = "q/edgex-profile-yaml")]
    ProfileYaml,
    /// Command rows of one device.
    #[strum(serialize = "q/edgex-commands")]
    Commands,
    /// Readings of one device over a time range.
    #[strum(serialize = "q/edgex-readings")]
    Readings,
    /// Schedules and schedule events.
    #[strum(serialize = "show-schedules")]
    ShowSchedules,
    /// Export registrations.
    #[strum(serialize = "show-exports")]
    ShowExports,
    /// Profiles page.
    #[strum(serialize = "show-profiles")]
    ShowProfiles,
    /// Devices page with related collections.
    #[strum(serialize = "show-devices")]
    ShowDevices,
    /// Addressables page.
    #[strum(serialize = "show-addressables")]
    ShowAddressables,
    /// Log entries over a time range.
    #[strum(serialize = "show-logs")]
    ShowLogs,
    /// Commands page of one device.
    #[strum(serialize = "show-commands")]
    ShowCommands,
    /// Notifications over a time range.
    #[strum(serialize = "show-notifications")]
    ShowNotifications,
    /// Transmissions over a time range or for one slug.
    #[strum(serialize = "show-transmissions")]
    ShowTransmissions,
    /// Subscriptions.
    #[strum(serialize = "show-subscriptions")]
    ShowSubscriptions,
    /// Device list for the readings page.
    #[strum(serialize = "reading-page")]
    ReadingPage,
    /// Current endpoint table.
    #[strum(serialize = "endpoint")]
    Endpoint,
    /// Password check.
    #[strum(serialize = "login")]
    Login,
    /// Password change.
    #[strum(serialize = "change-password")]
    ChangePassword,
}

impl QueryOp {
    /// Keyword the client queries.
    #[must_use]
    pub fn key(self) -> Keyword {
        Keyword::new(<&'static str>::from(self))
    }
}

/// Mutations served by the gateway, named without their namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum MutationOp {
    /// Locks or unlocks a device.
    UpdateLockMode,
    /// Replaces service addresses.
    SaveEndpoints,
    /// Registers an uploaded profile file.
    UploadProfile,
    /// Removes a device profile.
    DeleteProfile,
    /// Creates a device with its addressable.
    AddDevice,
    /// Removes a device and its addressable.
    DeleteDevice,
    /// Creates an addressable.
    AddAddressable,
    /// Updates an addressable.
    EditAddressable,
    /// Removes an addressable.
    DeleteAddressable,
    /// Creates a schedule.
    AddSchedule,
    /// Removes a schedule.
    DeleteSchedule,
    /// Creates a schedule event targeting an existing addressable.
    AddScheduleEvent,
    /// Removes a schedule event.
    DeleteScheduleEvent,
    /// Sends a set command to a device.
    IssueSetCommand,
    /// Registers an export client.
    AddExport,
    /// Updates an export registration.
    EditExport,
    /// Removes an export registration.
    DeleteExport,
    /// Creates a notification.
    AddNotification,
    /// Removes a notification.
    DeleteNotification,
    /// Creates a subscription.
    AddSubscription,
    /// Updates a subscription.
    EditSubscription,
    /// Removes a subscription.
    DeleteSubscription,
}

impl MutationOp {
    /// Fully qualified symbol the client sends.
    #[must_use]
    pub fn symbol(self) -> Symbol {
        let name: &'static str = self.into();
        Symbol::new(format!("{MUTATION_NAMESPACE}/{name}"))
    }
}

/// Query handler bound to one [`QueryOp`].
#[derive(Debug)]
pub struct GatewayQuery {
    op: QueryOp,
    services: Arc<Services>,
}

#[async_trait]
impl QueryHandler for GatewayQuery {
    async fn query(&self, _params: &[Value], args: &Args) -> Result<Value, HandlerError> {
        let services = self.services.as_ref();
        match self.op {
            QueryOp::Devices => Ok(metadata::devices(services).await?.into_value()),
            QueryOp::DeviceServices => Ok(metadata::device_services(services).await?.into_value()),
            QueryOp::ScheduleEvents => Ok(metadata::schedule_events(services).await?.into_value()),
            QueryOp::Addressables => Ok(metadata::addressables(services).await?.into_value()),
            QueryOp::Profiles => Ok(metadata::profiles(services).await?.into_value()),
            QueryOp::ProfileYaml => metadata::profile_yaml(services, args).await,
            QueryOp::Commands => commands::query(services, args).await,
            QueryOp::Readings => readings::query(services, args).await,
            QueryOp::ShowSchedules => metadata::show_schedules(services).await,
            QueryOp::ShowExports => metadata::show_exports(services).await,
            QueryOp::ShowProfiles => metadata::show_profiles(services).await,
            QueryOp::ShowDevices => metadata::show_devices(services).await,
            QueryOp::ShowAddressables => metadata::show_addressables(services).await,
            QueryOp::ShowLogs => logs::show_logs(services, args).await,
            QueryOp::ShowCommands => metadata::show_commands(services, args).await,
            QueryOp::ShowNotifications => notifications::show_notifications(services, args).await,
            QueryOp::ShowTransmissions => notifications::show_transmissions(services, args).await,
            QueryOp::ShowSubscriptions => notifications::show_subscriptions(services).await,
            QueryOp::ReadingPage => metadata::reading_page(services).await,
            QueryOp::Endpoint => Ok(settings::endpoints(services)),
            QueryOp::Login => auth::login(services, args).await,
            QueryOp::ChangePassword => auth::change_password(services, args).await,
        }
    }
}

/// Mutation handler bound to one [`MutationOp`].
#[derive(Debug)]
pub struct GatewayMutation {
    op: MutationOp,
    services: Arc<Services>,
}

#[async_trait]
impl MutationHandler for GatewayMutation {
    async fn mutate(&self, args: &Args) -> Result<Value, HandlerError> {
        let services = self.services.as_ref();
        match self.op {
            MutationOp::UpdateLockMode => devices::update_lock_mode(services, args).await,
            MutationOp::SaveEndpoints => settings::save_endpoints(services, args),
            MutationOp::UploadProfile => profiles::upload(services, args).await,
            MutationOp::DeleteProfile => profiles::delete(services, args).await,
            MutationOp::AddDevice => devices::add(services, args).await,
            MutationOp::DeleteDevice => devices::delete(services, args).await,
            MutationOp::AddAddressable => addressables::add(services, args).await,
            MutationOp::EditAddressable => addressables::edit(services, args).await,
            MutationOp::DeleteAddressable => addressables::delete(services, args).await,
            MutationOp::AddSchedule => schedules::add_schedule(services, args).await,
            MutationOp::DeleteSchedule => schedules::delete_schedule(services, args).await,
            MutationOp::AddScheduleEvent => schedules::add_schedule_event(services, args).await,
            MutationOp::DeleteScheduleEvent => {
                schedules::delete_schedule_event(services, args).await
            }
            MutationOp::IssueSetCommand => devices::issue_set_command(services, args).await,
            MutationOp::AddExport => exports::add(services, args).await,
            MutationOp::EditExport => exports::edit(services, args).await,
            MutationOp::DeleteExport => exports::delete(services, args).await,
            MutationOp::AddNotification => notifications::add_notification(services, args).await,
            MutationOp::DeleteNotification => {
                notifications::delete_notification(services, args).await
            }
            MutationOp::AddSubscription => notifications::add_subscription(services, args).await,
            MutationOp::EditSubscription => notifications::edit_subscription(services, args).await,
            MutationOp::DeleteSubscription => {
                notifications::delete_subscription(services, args).await
            }
        }
    }
}

/// Registers a handler for every query and mutation.
#[must_use]
pub fn registry(services: &Arc<Services>) -> Registry {
    let mut registry = Registry::new();
    for op in QueryOp::iter() {
        let handler = GatewayQuery {
            op,
            services: Arc::clone(services),
        };
        registry.register_query(op.key(), Arc::new(handler));
    }
    for op in MutationOp::iter() {
        let handler = GatewayMutation {
            op,
            services: Arc::clone(services),
        };
        registry.register_mutation(op.symbol(), Arc::new(handler));
    }
    registry
}

#[cfg(test)]
pub(crate) mod tests;
