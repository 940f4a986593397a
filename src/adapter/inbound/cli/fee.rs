//! Handler for the `fee` command.

use serde_json::{json, Value};

use super::command::FeeArgs;
use super::output;
use crate::application::DtcManager;
use crate::domain::amount::to_ui_string;
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap::Hub;
use crate::infrastructure::config::settings::Config;

/// Execute the fee command.
///
/// # Errors
///
/// Returns an error when the amount is not a number, the fee table cannot
/// be loaded, or the route has no fee table.
pub fn execute(config: &Config, args: &FeeArgs) -> Result<()> {
    let value: f64 = args
        .amount
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            field: "amount",
            reason: format!("{:?} is not a number", args.amount),
        })?;

    let hub = Hub::from_config(config)?;
    hub.dtcs.load_all_dtcs()?;
    let dtcs = &hub.dtcs;

    let to_include = dtcs.get_dtc_to_include(&args.token, &args.from, &args.to, value)?;
    let included = dtcs.get_included_dtc(&args.token, &args.from, &args.to, value)?;

    let units = match args.decimals {
        Some(decimals) => {
            let raw = DtcManager::from_ui_string(&args.amount, decimals);
            let fee = dtcs.get_dtc_to_include_big_int(&args.token, &args.from, &args.to, raw, decimals)?;
            let included_fee =
                dtcs.get_included_dtc_big_int(&args.token, &args.from, &args.to, raw, decimals)?;
            let minimum = dtcs
                .min_value_including_fee(&args.token, &args.from, &args.to, decimals)
                .ok();
            Some((decimals, fee, included_fee, minimum))
        }
        None => None,
    };

    if output::is_json() {
        let units_json = units.as_ref().map_or(Value::Null, |(_, fee, included_fee, minimum)| {
            json!({
                "fee_to_include": fee.to_string(),
                "included_fee": included_fee.to_string(),
                "min_value_including_fee": minimum,
            })
        });
        output::json_output(json!({
            "command": "fee",
            "route": format!("{}/{}/{}", args.token, args.from, args.to),
            "amount": args.amount,
            "fee_to_include": to_include.fee_str,
            "included_fee": included.fee_str,
            "units": units_json,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Route", format!("{} {} → {}", args.token, args.from, args.to));
    output::field("Amount", &args.amount);
    output::field("Fee to add", output::highlight(&to_include.fee_str));
    output::field("Fee included", &included.fee_str);
    if let Some((decimals, fee, included_fee, minimum)) = units {
        output::field("Add (units)", format!("{fee} ({})", to_ui_string(fee, decimals)));
        output::field("Incl. (units)", format!("{included_fee} ({})", to_ui_string(included_fee, decimals)));
        match minimum {
            Some(min) => output::field("Min transfer", min),
            None => output::warning("No tier fee covers itself"),
        }
    }
    Ok(())
}
