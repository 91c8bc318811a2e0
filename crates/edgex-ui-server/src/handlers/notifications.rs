//! Support-notifications: notifications, transmissions and subscriptions.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use edgex_transit::{Map, Value};
use edgex_ui_config::ServiceName;
use serde::Serialize;

use crate::dispatch::{Args, HandlerError, tempid_result};
use crate::fetch::{PageSource, PageWindow, TimeRange};
use crate::upstream::UpstreamError;

use super::context::Services;
use super::reshape::{Records, content, keywordize};

/// Window shown when transmissions are looked up by notification slug.
const SLUG_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Time-ranged notification-service collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NotifyKind {
    Notification,
    Transmission,
}

impl NotifyKind {
    fn path(self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::Transmission => "transmission",
        }
    }

    fn keyword_fields(self) -> &'static [&'static str] {
        match self {
            Self::Notification => &["id", "category", "severity", "status"],
            Self::Transmission => &["id", "status"],
        }
    }
}

/// Pages of notifications or transmissions, optionally for one slug.
pub(crate) struct NotifySource<'a> {
    services: &'a Services,
    kind: NotifyKind,
    slug: Option<String>,
}

impl<'a> NotifySource<'a> {
    pub(crate) fn new(services: &'a Services, kind: NotifyKind, slug: Option<String>) -> Self {
        Self {
            services,
            kind,
            slug,
        }
    }

    fn path(&self, window: PageWindow) -> String {
        let kind = self.kind.path();
        let PageWindow { from, to, limit } = window;
        match &self.slug {
            Some(slug) => format!("{kind}/slug/{slug}/start/{from}/end/{to}/{limit}"),
            None => format!("{kind}/start/{from}/end/{to}/{limit}"),
        }
    }
}

#[async_trait]
impl PageSource for NotifySource<'_> {
    type Record = Map;

    async fn fetch_page(&self, window: PageWindow) -> Result<Vec<Map>, UpstreamError> {
        let target = self
            .services
            .target(ServiceName::Notifications, &self.path(window));
        let url = target.url.clone();
        let json = self.services.downstream.get_json(target).await?;
        let mut records = Records::from_json(json, &url)?.typed(self.kind.path());
        for field in self.kind.keyword_fields() {
            records = records.keyword(&[*field]);
        }
        Ok(records.into_inner())
    }
}

async fn collect(
    services: &Services,
    kind: NotifyKind,
    slug: Option<String>,
    range: TimeRange,
) -> Result<Value, HandlerError> {
    let source = NotifySource::new(services, kind, slug);
    let fetched = services.fetch.collect(&source, range).await?;
    let items = fetched.items.into_iter().map(Value::Map).collect();
    Ok(Value::Map(content(Value::Vector(items))))
}

/// `show-notifications`: notifications created within `[:start, :end]`.
pub(super) async fn show_notifications(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let range = TimeRange::new(args.int("start")?, args.int("end")?);
    collect(services, NotifyKind::Notification, None, range).await
}

/// `show-transmissions`: transmissions within `[:start, :end]`, or those of
/// notification `:slug` from the last seven days.
pub(super) async fn show_transmissions(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let slug = args.string("slug")?;
    if slug.is_empty() {
        let range = TimeRange::new(args.int("start")?, args.int("end")?);
        collect(services, NotifyKind::Transmission, None, range).await
    } else {
        let range = last_week(SystemTime::now());
        collect(services, NotifyKind::Transmission, Some(slug), range).await
    }
}

fn last_week(now: SystemTime) -> TimeRange {
    let millis = |time: SystemTime| {
        time.duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
    };
    let start = now.checked_sub(SLUG_WINDOW).unwrap_or(UNIX_EPOCH);
    TimeRange::new(millis(start), millis(now))
}

pub(super) async fn show_subscriptions(services: &Services) -> Result<Value, HandlerError> {
    let subscriptions = services
        .get_records(ServiceName::Notifications, "subscription")
        .await?
        .typed("subscription")
        .keyword(&["id"]);
    Ok(Value::Map(content(subscriptions.into_value())))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Notification {
    slug: String,
    sender: String,
    category: String,
    severity: String,
    content: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    labels: Vec<String>,
}

pub(super) async fn add_notification(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let tempid = args.tempid("tempid")?;
    let notification = Notification {
        slug: args.string("slug")?,
        sender: args.string("sender")?,
        category: args.text("category")?,
        severity: args.text("severity")?,
        content: args.string("content")?,
        description: args.string("description")?,
        labels: args.string_seq("labels")?,
    };
    let target = services.target(ServiceName::Notifications, "notification");
    let id = services.downstream.post_json(target, &notification).await?;
    Ok(tempid_result(tempid, Value::keyword(id)))
}

pub(super) async fn delete_notification(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let slug = args.string("slug")?;
    let target = services.target(
        ServiceName::Notifications,
        &format!("notification/slug/{slug}"),
    );
    services.downstream.delete(target).await?;
    Ok(Value::String(slug))
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct Channel {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    kind: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    mail_addresses: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Subscription {
    #[serde(skip_serializing_if = "String::is_empty")]
    id: String,
    slug: String,
    receiver: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    subscribed_categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    subscribed_labels: Vec<String>,
    channels: Vec<Channel>,
}

impl Subscription {
    fn from_args(id: String, args: &Args) -> Result<Self, HandlerError> {
        Ok(Self {
            id,
            slug: args.string("slug")?,
            receiver: args.string("receiver")?,
            description: args.string("description")?,
            subscribed_categories: args.string_seq("subscribedCategories")?,
            subscribed_labels: args.string_seq("subscribedLabels")?,
            channels: channels(args)?,
        })
    }
}

fn channels(args: &Args) -> Result<Vec<Channel>, HandlerError> {
    args.seq("channels")?
        .iter()
        .map(|entry| {
            let Some(entry) = entry.as_map() else {
                return Err(HandlerError::invalid_argument(
                    "channels",
                    format!("expected a map, found {}", entry.kind()),
                ));
            };
            let channel = Args::new(entry.clone());
            Ok(Channel {
                kind: channel.text("type")?,
                mail_addresses: channel.string_seq("mailAddresses")?,
                url: channel.string("url")?,
            })
        })
        .collect()
}

/// Creates a subscription, then reads it back by slug for its id; the
/// create response does not carry one.
pub(super) async fn add_subscription(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let tempid = args.tempid("tempid")?;
    let subscription = Subscription::from_args(String::new(), args)?;
    let target = services.target(ServiceName::Notifications, "subscription");
    services.downstream.post_json(target, &subscription).await?;

    let path = format!("subscription/slug/{}", subscription.slug);
    let target = services.target(ServiceName::Notifications, &path);
    let url = target.url.clone();
    let created = keywordize(services.downstream.get_json(target).await?);
    let Some(id) = created
        .as_map()
        .and_then(|map| map.get_keyword("id"))
        .and_then(Value::as_str)
    else {
        return Err(UpstreamError::decode(url, "subscription has no id").into());
    };
    Ok(tempid_result(tempid, Value::keyword(id)))
}

pub(super) async fn edit_subscription(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let id = args.keyword("id")?;
    let subscription = Subscription::from_args(id.as_str().to_owned(), args)?;
    let target = services.target(ServiceName::Notifications, "subscription");
    services.downstream.put_json(target, &subscription).await?;
    Ok(Value::Keyword(id))
}

pub(super) async fn delete_subscription(
    services: &Services,
    args: &Args,
) -> Result<Value, HandlerError> {
    let slug = args.string("slug")?;
    let target = services.target(
        ServiceName::Notifications,
        &format!("subscription/slug/{slug}"),
    );
    services.downstream.delete(target).await?;
    Ok(Value::String(slug))
}
