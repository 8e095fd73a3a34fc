//! Built-in action handlers

use super::calculator;
use super::effects::ActionEffects;
use super::{text_param, ActionDescriptor, ActionHandler, ActionResult, Parameters};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Site names that resolve to a canonical URL
const SITE_SHORTCUTS: &[(&str, &str)] = &[
    ("google", "https://google.com"),
    ("youtube", "https://youtube.com"),
    ("github", "https://github.com"),
    ("stackoverflow", "https://stackoverflow.com"),
    ("reddit", "https://reddit.com"),
    ("twitter", "https://twitter.com"),
    ("facebook", "https://facebook.com"),
    ("linkedin", "https://linkedin.com"),
    ("gmail", "https://gmail.com"),
];

const SEARCH_URL: &str = "https://www.google.com/search?q=";

/// The default action set, in registration order
pub fn builtin_actions(effects: Arc<dyn ActionEffects>) -> Vec<ActionDescriptor> {
    vec![
        ActionDescriptor::new(
            "open_url",
            "Open a URL in a new browser tab",
            &["url"],
            OpenUrl {
                effects: Arc::clone(&effects),
            },
        ),
        ActionDescriptor::new(
            "web_search",
            "Perform a web search",
            &["query"],
            WebSearch {
                effects: Arc::clone(&effects),
            },
        ),
        ActionDescriptor::new(
            "set_timer",
            "Set a timer for specified duration",
            &["duration", "unit"],
            SetTimer { effects },
        ),
        ActionDescriptor::new(
            "calculate",
            "Perform mathematical calculations",
            &["expression"],
            calculate,
        ),
        ActionDescriptor::new(
            "get_weather",
            "Get current weather information",
            &["location"],
            get_weather,
        ),
        ActionDescriptor::new(
            "smart_home_control",
            "Control smart home devices",
            &["action", "device"],
            smart_home_control,
        ),
    ]
}

/// Resolve a site name or bare host into a full URL
pub fn resolve_url(target: &str) -> String {
    if target.starts_with("http://") || target.starts_with("https://") {
        return target.to_string();
    }

    let lower = target.to_lowercase();
    SITE_SHORTCUTS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, url)| url.to_string())
        .unwrap_or_else(|| format!("https://{}", target))
}

/// Build the search URL for a query
pub fn search_url(query: &str) -> String {
    format!("{}{}", SEARCH_URL, urlencoding::encode(query))
}

/// Timer length in milliseconds for a duration and unit, `None` on overflow
pub fn timer_millis(duration: u64, unit: &str) -> Option<u64> {
    let unit = unit.to_lowercase();
    if unit.contains("hour") || unit.contains("hr") {
        duration.checked_mul(3_600_000)
    } else if unit.contains("sec") {
        duration.checked_mul(1_000)
    } else {
        duration.checked_mul(60_000)
    }
}

struct OpenUrl {
    effects: Arc<dyn ActionEffects>,
}

#[async_trait]
impl ActionHandler for OpenUrl {
    async fn handle(&self, parameters: &Parameters) -> ActionResult {
        let target = ["url", "site", "website"]
            .iter()
            .find_map(|key| text_param(parameters, key));
        let Some(target) = target else {
            return ActionResult::failure("No URL provided");
        };

        let url = resolve_url(&target);
        match self.effects.open_url(&url) {
            Ok(()) => ActionResult::ok(format!("Opening {}", url)).with_data(json!({ "url": url })),
            Err(e) => {
                warn!("Failed to open {}: {}", url, e);
                ActionResult::failure(format!("Failed to open {}: {}", url, e))
            }
        }
    }
}

struct WebSearch {
    effects: Arc<dyn ActionEffects>,
}

#[async_trait]
impl ActionHandler for WebSearch {
    async fn handle(&self, parameters: &Parameters) -> ActionResult {
        let Some(query) = text_param(parameters, "query") else {
            return ActionResult::failure("No search query provided");
        };

        let url = search_url(&query);
        match self.effects.open_url(&url) {
            Ok(()) => ActionResult::ok(format!("Searching for \"{}\"", query))
                .with_data(json!({ "query": query, "url": url })),
            Err(e) => {
                warn!("Failed to open search for {}: {}", query, e);
                ActionResult::failure(format!("Failed to open {}: {}", url, e))
            }
        }
    }
}

struct SetTimer {
    effects: Arc<dyn ActionEffects>,
}

#[async_trait]
impl ActionHandler for SetTimer {
    async fn handle(&self, parameters: &Parameters) -> ActionResult {
        let duration = match parameters.get("duration") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        let Some(duration) = duration.filter(|d| *d > 0) else {
            return ActionResult::failure("Invalid timer duration");
        };
        let unit = text_param(parameters, "unit").unwrap_or_else(|| "minutes".to_string());

        let Some(milliseconds) = timer_millis(duration, &unit) else {
            return ActionResult::failure("Invalid timer duration");
        };
        let effects = Arc::clone(&self.effects);
        let label = format!("{} {}", duration, unit);

        // Fire and forget; completion is reported through the effects boundary
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(milliseconds)).await;
            info!("Timer finished: {}", label);
            effects.notify(
                "Timer Complete",
                &format!("Your {} timer has finished!", label),
            );
            effects.play_alert();
        });
        debug!("Timer scheduled for {}ms", milliseconds);

        ActionResult::ok(format!("Timer set for {} {}", duration, unit)).with_data(json!({
            "duration": duration,
            "unit": unit,
            "milliseconds": milliseconds,
        }))
    }
}

fn calculate(parameters: &Parameters) -> ActionResult {
    let Some(expression) = text_param(parameters, "expression") else {
        return ActionResult::failure("No expression provided");
    };

    if !calculator::is_allowed(&expression) {
        return ActionResult::failure("Invalid expression");
    }

    match calculator::evaluate(&expression) {
        Ok(result) => ActionResult::ok(format!("{} = {}", expression, result))
            .with_data(json!({ "expression": expression, "result": result })),
        Err(e) => {
            debug!("Calculation of {:?} failed: {}", expression, e);
            ActionResult::failure("Invalid mathematical expression")
        }
    }
}

fn get_weather(parameters: &Parameters) -> ActionResult {
    let location =
        text_param(parameters, "location").unwrap_or_else(|| "current location".to_string());
    ActionResult::ok(format!(
        "I'd need to connect to a weather service to get the current weather for {}. \
         This feature will be available with API integration.",
        location
    ))
}

fn smart_home_control(parameters: &Parameters) -> ActionResult {
    let action = text_param(parameters, "action").unwrap_or_else(|| "control".to_string());
    let device = text_param(parameters, "device").unwrap_or_else(|| "device".to_string());
    ActionResult::ok(format!(
        "I would {} the {} if connected to a smart home system. \
         This requires Home Assistant or similar integration.",
        action, device
    ))
    .with_data(json!({ "action": action, "device": device }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionRouter;
    use crate::Result;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingEffects {
        opened: Mutex<Vec<String>>,
        notifications: Mutex<Vec<(String, String)>>,
        alerts: Mutex<usize>,
    }

    impl ActionEffects for RecordingEffects {
        fn open_url(&self, url: &str) -> Result<()> {
            self.opened.lock().push(url.to_string());
            Ok(())
        }

        fn notify(&self, title: &str, body: &str) {
            self.notifications
                .lock()
                .push((title.to_string(), body.to_string()));
        }

        fn play_alert(&self) {
            *self.alerts.lock() += 1;
        }
    }

    fn router() -> (ActionRouter, Arc<RecordingEffects>) {
        let effects = Arc::new(RecordingEffects::default());
        (ActionRouter::with_builtins(effects.clone()), effects)
    }

    fn params(value: Value) -> Parameters {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(resolve_url("github"), "https://github.com");
        assert_eq!(resolve_url("GitHub"), "https://github.com");
        assert_eq!(resolve_url("example.org"), "https://example.org");
        assert_eq!(resolve_url("http://localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn test_timer_millis() {
        assert_eq!(timer_millis(5, "minutes"), Some(300_000));
        assert_eq!(timer_millis(5, "min"), Some(300_000));
        assert_eq!(timer_millis(30, "seconds"), Some(30_000));
        assert_eq!(timer_millis(2, "hours"), Some(7_200_000));
        assert_eq!(timer_millis(1, "hr"), Some(3_600_000));
        assert_eq!(timer_millis(u64::MAX / 1_000, "hours"), None);
    }

    #[tokio::test]
    async fn test_open_url() {
        let (router, effects) = router();
        let result = router
            .execute("open_url", &params(json!({ "url": "github" })))
            .await;
        assert!(result.success);
        assert_eq!(result.message, "Opening https://github.com");
        assert_eq!(effects.opened.lock().as_slice(), ["https://github.com"]);

        let result = router
            .execute("open_url", &params(json!({ "website": "rust-lang.org" })))
            .await;
        assert_eq!(result.message, "Opening https://rust-lang.org");

        let result = router.execute("open_url", &Parameters::new()).await;
        assert!(!result.success);
        assert_eq!(result.message, "No URL provided");
    }

    #[tokio::test]
    async fn test_web_search_encodes_query() {
        let (router, effects) = router();
        let result = router
            .execute("web_search", &params(json!({ "query": "cats & dogs" })))
            .await;
        assert!(result.success);
        assert_eq!(result.message, "Searching for \"cats & dogs\"");
        assert_eq!(
            effects.opened.lock()[0],
            "https://www.google.com/search?q=cats%20%26%20dogs"
        );

        let result = router.execute("web_search", &Parameters::new()).await;
        assert_eq!(result.message, "No search query provided");
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_timer_fires_later() {
        let (router, effects) = router();
        let result = router
            .execute(
                "set_timer",
                &params(json!({ "duration": "5", "unit": "minutes" })),
            )
            .await;
        assert!(result.success);
        assert_eq!(result.message, "Timer set for 5 minutes");
        assert_eq!(result.data.unwrap()["milliseconds"], 300_000);
        assert!(effects.notifications.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(300_001)).await;
        tokio::task::yield_now().await;

        let notifications = effects.notifications.lock();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].0, "Timer Complete");
        assert_eq!(notifications[0].1, "Your 5 minutes timer has finished!");
        assert_eq!(*effects.alerts.lock(), 1);
    }

    #[tokio::test]
    async fn test_set_timer_rejects_bad_duration() {
        let (router, _) = router();
        for duration in [json!("0"), json!("-3"), json!("soon"), json!(null)] {
            let result = router
                .execute("set_timer", &params(json!({ "duration": duration })))
                .await;
            assert!(!result.success);
            assert_eq!(result.message, "Invalid timer duration");
        }
    }

    #[tokio::test]
    async fn test_set_timer_rejects_overflowing_duration() {
        let (router, effects) = router();
        let result = router
            .execute(
                "set_timer",
                &params(json!({ "duration": "99999999999999", "unit": "hours" })),
            )
            .await;
        assert!(!result.success);
        assert_eq!(result.message, "Invalid timer duration");
        assert!(effects.notifications.lock().is_empty());
    }

    #[tokio::test]
    async fn test_set_timer_defaults_to_minutes() {
        let (router, _) = router();
        let result = router
            .execute("set_timer", &params(json!({ "duration": 2 })))
            .await;
        assert_eq!(result.message, "Timer set for 2 minutes");
        assert_eq!(result.data.unwrap()["milliseconds"], 120_000);
    }

    #[tokio::test]
    async fn test_calculate() {
        let (router, _) = router();
        let result = router
            .execute("calculate", &params(json!({ "expression": "2 + 2" })))
            .await;
        assert!(result.success);
        assert_eq!(result.message, "2 + 2 = 4");
        assert_eq!(result.data.unwrap()["result"], 4.0);

        let result = router
            .execute("calculate", &params(json!({ "expression": "alert(1)" })))
            .await;
        assert!(!result.success);
        assert_eq!(result.message, "Invalid expression");

        let result = router
            .execute("calculate", &params(json!({ "expression": "2 * (3" })))
            .await;
        assert_eq!(result.message, "Invalid mathematical expression");

        let nested = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        let result = router
            .execute("calculate", &params(json!({ "expression": nested })))
            .await;
        assert!(!result.success);
        assert_eq!(result.message, "Invalid mathematical expression");

        let result = router.execute("calculate", &Parameters::new()).await;
        assert_eq!(result.message, "No expression provided");
    }

    #[tokio::test]
    async fn test_stubs_always_succeed() {
        let (router, _) = router();
        let result = router.execute("get_weather", &Parameters::new()).await;
        assert!(result.success);
        assert!(result.message.contains("current location"));

        let result = router
            .execute(
                "smart_home_control",
                &params(json!({ "action": "dim", "device": "lamp" })),
            )
            .await;
        assert!(result.success);
        assert!(result.message.starts_with("I would dim the lamp"));
    }
}
