//! Transformation of events into the sink's transport encoding.

use crate::client::ClientConfig;
use crate::events::Event;
use url::form_urlencoded;

/// Encode an event as a Measurement Protocol form payload.
///
/// The key set is a fixed contract with the collection endpoint:
/// `v`/`t`/`aip` are protocol literals, `cid`/`tid`/`an`/`av` come from
/// the client configuration, and the event fields map to `ea` (action),
/// `ec` (category) and `cd1` (user). The sink treats pair order as
/// insignificant.
pub fn encode(client: &ClientConfig, event: &Event) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair("v", "1")
        .append_pair("t", "event")
        .append_pair("cid", &client.client_id)
        .append_pair("tid", &client.tracking_id)
        .append_pair("an", &client.app_name)
        .append_pair("av", &client.app_version)
        .append_pair("aip", "0")
        .append_pair("cd1", &event.user)
        .append_pair("ec", &event.category)
        .append_pair("ea", &event.action)
        .finish()
}
