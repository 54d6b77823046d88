//! Sample warble hooks.
//!
//! Hooks are plain Rust functions registered under a dotted name; the
//! configuration file references them as `module:function()`. Build a
//! registry like the one below and hand it to the engine at startup:
//!
//! ```ignore
//! let mut hooks = HookRegistry::new();
//! register(&mut hooks);
//! let engine = Engine::bootstrap(&ini, &settings, hooks, factories)?;
//! ```

use warble_core::{DataMap, TargetAddr, Value};
use warble_engine::{CronContext, HookError, HookRegistry};

pub fn register(hooks: &mut HookRegistry) {
    hooks.register_filter("samplehooks:battery_ok", |_topic, payload| {
        // Suppress messages whose JSON `batt` level is above 20 percent.
        let batt = serde_json::from_str::<serde_json::Value>(payload)
            .ok()
            .and_then(|v| v.get("batt").and_then(|b| b.as_f64()));
        Ok(matches!(batt, Some(level) if level > 20.0))
    });

    hooks.register_alldata("samplehooks:decorate", |topic, _data| {
        // Contribute the second topic level as `device`.
        let device = topic.split('/').nth(1).unwrap_or("unknown").to_string();
        let mut extra = DataMap::new();
        extra.insert("device".into(), Value::Str(device));
        Ok(Some(extra))
    });

    hooks.register_targets("samplehooks:by_severity", |_section, _topic, data| {
        // Route alarms to the crit log target, everything else to info.
        let severity = data.get("severity").map(Value::render).unwrap_or_default();
        let target = if severity == "alarm" { "log:crit" } else { "log:info" };
        Ok(vec![TargetAddr::parse(target)])
    });

    hooks.register_xform("samplehooks:uppercase", |value, _data| {
        Ok(Value::Str(value.render().to_uppercase()))
    });

    hooks.register_cron("samplehooks:heartbeat", |ctx: CronContext| async move {
        ctx.publish("status/heartbeat", "ok").await.map_err(|e| HookError::failed(e.to_string()))
    });
}
