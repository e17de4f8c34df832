//! Address and identifier checks: email, URL, IP, UUID and phone numbers.

use serde_json::Value;
use uuid::Uuid;
use validator::{ValidateEmail, ValidateIp, ValidateUrl};

use super::{count_option, pattern};
use crate::handler::{Check, CheckArgs, HandlerEntry, Outcome};
use crate::messages::MessageTable;
use crate::registry::Registry;

pub(super) fn register(handlers: &mut Registry, messages: &mut MessageTable) {
    handlers.register(
        "email",
        HandlerEntry::test(|value, _| value.as_str().is_some_and(|s| s.validate_email())),
    );
    messages.set("email", "is not a valid email address");

    handlers.register(
        "url",
        HandlerEntry::test(|value, _| value.as_str().is_some_and(|s| s.validate_url())),
    );
    messages.set("url", "is not a valid URL");

    handlers.register(
        "ip",
        HandlerEntry::formats([
            (
                "ipv4",
                Check::test(|value, _| value.as_str().is_some_and(|s| s.validate_ipv4())),
            ),
            (
                "ipv6",
                Check::test(|value, _| value.as_str().is_some_and(|s| s.validate_ipv6())),
            ),
        ]),
    );
    messages.set("ip", "is not a valid IP address");

    handlers.register("uuid", HandlerEntry::predicate(uuid_version));
    messages.set("uuid", "is not a valid UUID");

    handlers.register(
        "phone",
        HandlerEntry::formats([
            ("e164", pattern(r"\+[1-9][0-9]{6,14}")),
            (
                "nanp",
                pattern(r"(?:\+?1[ .-]?)?\(?[2-9][0-9]{2}\)?[ .-]?[0-9]{3}[ .-]?[0-9]{4}"),
            ),
        ]),
    );
    messages.set("phone", "is not a valid phone number");
}

fn uuid_version(value: &Value, args: &CheckArgs<'_>) -> Outcome {
    let Some(parsed) = value.as_str().and_then(|s| Uuid::parse_str(s).ok()) else {
        return Outcome::fail();
    };

    match args.option("version") {
        Some(_) => match count_option("uuid", args, "version") {
            Some(expected) => Outcome::from_bool(parsed.get_version_num() == expected)
                .with_param("version", expected),
            None => Outcome::fail(),
        },
        None => Outcome::pass().with_param("version", parsed.get_version_num()),
    }
}
