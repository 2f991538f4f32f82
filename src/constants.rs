//! Application-wide constants: endpoint presets, workflow defaults and
//! fixed key material.

use std::time::Duration;

/// Main loop tick rate. The loop sleeps up to this long when idle.
pub const TICK_RATE: Duration = Duration::from_millis(50);

/// Endpoint presets offered on the Main tab. The last entry ("Custom")
/// intentionally carries no URL: selecting it leaves the endpoint field
/// untouched so a previously typed value stays editable.
pub const ENDPOINT_PRESETS: [(&str, &str); 4] = [
    ("Local", "http://localhost:4000"),
    ("Testnet", "https://testnet.archethic.net"),
    ("Mainnet", "https://mainnet.archethic.net"),
    ("Custom", ""),
];

/// Index of the "Custom" preset in [`ENDPOINT_PRESETS`].
pub const CUSTOM_PRESET: usize = 3;

/// Additional dispatch attempts after the first one fails.
pub const DISPATCH_RETRIES: u32 = 1;

/// Per-attempt dispatch timeout.
pub const DISPATCH_TIMEOUT: Duration = Duration::from_millis(1000);

/// Origin private key used for the origin signature, hex encoded with a
/// two byte curve/origin header. This is the well-known shared test key;
/// transactions signed with it are only accepted by networks that allow
/// the software origin.
pub const ORIGIN_PRIVATE_KEY_HEX: &str =
    "01019280BDB84B8F8AEDBA205FE3552689964A5626EE2C60AA10E3BF22A91A036009";
