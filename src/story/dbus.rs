//! D-Bus transport for the story service — proxy, blocking call wrapper,
//! and signal forwarding.
//!
//! The service exports one interface on the session bus:
//!
//! ```text
//! interface net.danigm.lils {
//!   launch(s filename) -> (as)
//!   choose(u option)   -> (as)
//!   output()           -> (as)
//!   options()          -> (as)
//!   var(s name)        -> (v)
//!   finished()         -> (b)
//!   reset()
//!   signal changed
//!   signal reset
//! }
//! ```

use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use zbus::proxy;
use zbus::zvariant::Value;

use super::config::ServiceConfig;
use super::{StoryError, StoryService, group_paragraphs};

#[proxy(
    interface = "net.danigm.lils",
    default_service = "net.danigm.lils",
    default_path = "/net/danigm/lils"
)]
trait Story {
    #[zbus(name = "launch")]
    fn launch(&self, filename: &str) -> zbus::Result<Vec<String>>;

    #[zbus(name = "choose")]
    fn choose(&self, option: u32) -> zbus::Result<Vec<String>>;

    #[zbus(name = "output")]
    fn output(&self) -> zbus::Result<Vec<String>>;

    #[zbus(name = "options")]
    fn options(&self) -> zbus::Result<Vec<String>>;

    #[zbus(name = "var")]
    fn var(&self, name: &str) -> zbus::Result<zbus::zvariant::OwnedValue>;

    #[zbus(name = "finished")]
    fn finished(&self) -> zbus::Result<bool>;

    #[zbus(name = "reset")]
    fn reset(&self) -> zbus::Result<()>;

    #[zbus(signal, name = "changed")]
    fn changed(&self) -> zbus::Result<()>;

    #[zbus(signal, name = "reset")]
    fn reset_occurred(&self) -> zbus::Result<()>;
}

/// A notification pushed by the service independent of any direct call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceEvent {
    /// Story state changed on the service side.
    Changed,
    /// The service restarted the current story.
    Reset,
}

/// An open connection to the story service on the session bus.
///
/// Every call blocks the calling turn on the owned runtime handle until the
/// single reply (or error) arrives, so no two calls are ever in flight at
/// once.
pub struct DbusStoryClient {
    runtime: tokio::runtime::Handle,
    proxy: StoryProxy<'static>,
}

impl DbusStoryClient {
    /// Connect to the session bus and start forwarding service signals
    /// into `events`.
    pub fn connect(
        config: &ServiceConfig,
        runtime: tokio::runtime::Handle,
        events: UnboundedSender<ServiceEvent>,
    ) -> Result<Self, StoryError> {
        let bus_name = config.bus_name.clone();
        let object_path = config.object_path.clone();

        let proxy = runtime.block_on(async move {
            let connection = zbus::Connection::session().await?;
            StoryProxy::builder(&connection)
                .destination(bus_name)?
                .path(object_path)?
                .build()
                .await
        })?;

        spawn_signal_listeners(&runtime, proxy.clone(), events);

        Ok(DbusStoryClient { runtime, proxy })
    }

    /// Read a story variable. The service wraps replies in nested variant
    /// layers, so the value is unwrapped down to something printable.
    pub fn var(&mut self, name: &str) -> Result<String, StoryError> {
        let value = self.runtime.block_on(self.proxy.var(name))?;
        render_variant(&value)
    }
}

impl StoryService for DbusStoryClient {
    fn launch(&mut self, path: &str) -> Result<Vec<String>, StoryError> {
        let lines = self.runtime.block_on(self.proxy.launch(path))?;
        Ok(group_paragraphs(&lines))
    }

    fn choose(&mut self, option: u32) -> Result<Vec<String>, StoryError> {
        let lines = self.runtime.block_on(self.proxy.choose(option))?;
        Ok(group_paragraphs(&lines))
    }

    fn output(&mut self) -> Result<Vec<String>, StoryError> {
        let lines = self.runtime.block_on(self.proxy.output())?;
        Ok(group_paragraphs(&lines))
    }

    fn options(&mut self) -> Result<Vec<String>, StoryError> {
        Ok(self.runtime.block_on(self.proxy.options())?)
    }

    fn finished(&mut self) -> Result<bool, StoryError> {
        Ok(self.runtime.block_on(self.proxy.finished())?)
    }

    fn reset(&mut self) -> Result<(), StoryError> {
        Ok(self.runtime.block_on(self.proxy.reset())?)
    }
}

/// Forward `changed` and `reset` signals into the TUI's event channel.
///
/// The tasks end on their own when the channel closes or the bus drops the
/// subscription.
fn spawn_signal_listeners(
    runtime: &tokio::runtime::Handle,
    proxy: StoryProxy<'static>,
    events: UnboundedSender<ServiceEvent>,
) {
    let changed_proxy = proxy.clone();
    let changed_tx = events.clone();
    runtime.spawn(async move {
        let Ok(mut stream) = changed_proxy.receive_changed().await else {
            return;
        };
        while stream.next().await.is_some() {
            if changed_tx.send(ServiceEvent::Changed).is_err() {
                break;
            }
        }
    });

    runtime.spawn(async move {
        let Ok(mut stream) = proxy.receive_reset_occurred().await else {
            return;
        };
        while stream.next().await.is_some() {
            if events.send(ServiceEvent::Reset).is_err() {
                break;
            }
        }
    });
}

/// Unwrap a variant reply into display text.
///
/// The service replies with scalars, string arrays, or single-field
/// structures wrapping one of those; anything else is a malformed reply.
fn render_variant(value: &Value<'_>) -> Result<String, StoryError> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::I32(n) => Ok(n.to_string()),
        Value::U32(n) => Ok(n.to_string()),
        Value::F64(n) => Ok(n.to_string()),
        Value::Array(items) => {
            let mut parts = Vec::new();
            for item in items.iter() {
                match item {
                    Value::Str(s) => parts.push(s.to_string()),
                    other => {
                        return Err(StoryError::MalformedReply(format!(
                            "unexpected array element: {other:?}"
                        )));
                    }
                }
            }
            Ok(parts.join(", "))
        }
        Value::Structure(fields) => match fields.fields() {
            [single] => render_variant(single),
            other => Err(StoryError::MalformedReply(format!(
                "expected a single-field structure, got {} fields",
                other.len()
            ))),
        },
        Value::Value(inner) => render_variant(inner),
        other => Err(StoryError::MalformedReply(format!(
            "unsupported value type: {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use zbus::zvariant::{StructureBuilder, Value};

    use super::render_variant;

    #[test]
    fn scalars_render_directly() {
        assert_eq!(render_variant(&Value::from("hero")).unwrap(), "hero");
        assert_eq!(render_variant(&Value::from(true)).unwrap(), "true");
        assert_eq!(render_variant(&Value::from(3_i32)).unwrap(), "3");
    }

    #[test]
    fn string_arrays_join_with_commas() {
        let value = Value::from(vec!["a", "b"]);
        assert_eq!(render_variant(&value).unwrap(), "a, b");
    }

    #[test]
    fn single_field_structures_unwrap() {
        let structure = StructureBuilder::new().add_field("inner").build().unwrap();
        assert_eq!(
            render_variant(&Value::Structure(structure)).unwrap(),
            "inner"
        );
    }

    #[test]
    fn unsupported_types_are_malformed() {
        assert!(render_variant(&Value::from(7_u8)).is_err());
    }
}
