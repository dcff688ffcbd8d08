#![cfg(feature = "openai")]

use codebridge::openai::api_v1::{ToolCall, ToolSpec, tool_specs};
use codebridge::openai::error::OpenAiError;
use codebridge::{Tool, ToolBox, ToolError};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

#[derive(Deserialize, JsonSchema)]
struct CurrentWeather {
    /// The city and state, e.g. San Francisco, CA
    location: String,
    /// The temperature unit to use. Infer this from the user's location.
    format: TemperatureUnit,
}

#[derive(Deserialize, JsonSchema)]
struct Pair {
    /// The first number
    a: i64,
    /// The second number
    b: i64,
}

fn tools() -> ToolBox {
    ToolBox::new()
        .with_tool(
            Tool::sync("get_current_weather", "Get the current weather", |args: CurrentWeather| {
                let temperature = match args.format {
                    TemperatureUnit::Celsius => "25°C",
                    TemperatureUnit::Fahrenheit => "77°F",
                };
                Ok::<_, String>(json!({
                    "location": args.location,
                    "temperature": temperature,
                    "condition": "Sunny"
                }))
            })
            .unwrap(),
        )
        .with_tool(
            Tool::asynchronous("add_numbers", "Adds two integers and returns the sum.", |p: Pair| async move {
                Ok::<_, String>(p.a + p.b)
            })
            .unwrap(),
        )
}

fn call(id: &str, name: &str, arguments: &str) -> ToolCall {
    serde_json::from_value(json!({
        "id": id,
        "type": "function",
        "function": {"name": name, "arguments": arguments}
    }))
    .unwrap()
}

#[test]
fn specs_follow_openai_shape() {
    let specs = serde_json::to_value(tool_specs(&tools())).unwrap();

    assert_eq!(specs[0]["function"]["name"], "get_current_weather");
    assert_eq!(
        specs[0]["function"]["parameters"]["properties"]["format"]["enum"],
        json!(["celsius", "fahrenheit"])
    );
    assert_eq!(specs[1]["function"]["parameters"]["required"], json!(["a", "b"]));
    assert!(specs[1]["function"].get("async").is_none());

    let parsed: Vec<ToolSpec> = serde_json::from_value(specs).unwrap();
    assert_eq!(parsed.len(), 2);
}

#[tokio::test]
async fn calls_are_routed_by_name() {
    let tools = tools();

    let weather = call("c1", "get_current_weather", r#"{"location": "Berlin", "format": "celsius"}"#)
        .dispatch(&tools)
        .await
        .unwrap();
    assert_eq!(weather["temperature"], "25°C");

    let sum = call("c2", "add_numbers", r#"{"a": 3, "b": 4.0}"#)
        .dispatch(&tools)
        .await
        .unwrap();
    assert_eq!(sum, json!(7));
}

#[tokio::test]
async fn bad_calls_are_answered_with_errors() {
    let tools = tools();

    assert!(matches!(
        call("c3", "get_current_weather", r#"{"location": "Berlin", "format": "kelvin"}"#)
            .dispatch(&tools)
            .await,
        Err(OpenAiError::Tool(ToolError::Validation { .. }))
    ));
    assert!(matches!(
        call("c4", "launch_rockets", "{}").dispatch(&tools).await,
        Err(OpenAiError::Tool(ToolError::UnknownTool(_)))
    ));

    let answer = call("c5", "add_numbers", r#"{"a": 1}"#).respond(&tools).await;
    assert_eq!(answer.tool_call_id, "c5");
    assert!(answer.content.contains("b: field required"));
}
