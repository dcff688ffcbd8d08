use codebridge::openai::api_v1::{ToolCall, ToolChoice, tool_specs};
use codebridge::{Tool, ToolBox};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Example  –  OpenAI “Function Calling”, offline
///
/// Builds the `tools` array of a chat completion request from a typed tool,
/// then answers a canned assistant message carrying two tool calls: one
/// well-formed, one the model got wrong.
///
/// **Running the demo**
/// ```bash
/// RUST_LOG=debug cargo run -p codebridge --example openai_tool_weather
/// ```
/// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum Unit {
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct WeatherQuery {
    /// The city and state, e.g. San Francisco, CA
    location: String,
    unit: Option<Unit>,
}

#[derive(Debug, Serialize, JsonSchema)]
struct WeatherReport {
    location: String,
    value: f64,
    unit: String,
}

async fn current_weather(query: WeatherQuery) -> Result<WeatherReport, String> {
    let unit = match query.unit.unwrap_or(Unit::Celsius) {
        Unit::Celsius => "celsius",
        Unit::Fahrenheit => "fahrenheit",
    };
    Ok(WeatherReport {
        location: query.location,
        value: 32.2,
        unit: unit.to_string(),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tools = ToolBox::new().with_tool(Tool::asynchronous(
        "current_weather",
        "Fetch the current weather report (temperature and unit).",
        current_weather,
    )?);

    let request_fragment = serde_json::json!({
        "tools": tool_specs(&tools),
        "tool_choice": ToolChoice::Auto,
    });
    println!("{}", serde_json::to_string_pretty(&request_fragment)?);

    let tool_calls: Vec<ToolCall> = serde_json::from_value(serde_json::json!([
        {
            "id": "call_berlin",
            "type": "function",
            "function": {
                "name": "current_weather",
                "arguments": "{\"location\": \"Berlin\", \"unit\": \"celsius\"}"
            }
        },
        {
            "id": "call_broken",
            "type": "function",
            "function": {
                "name": "current_weather",
                "arguments": "{\"unit\": \"kelvin\"}"
            }
        }
    ]))?;

    for call in &tool_calls {
        let answer = call.respond(&tools).await;
        println!("{}", serde_json::to_string_pretty(&answer)?);
    }

    Ok(())
}
