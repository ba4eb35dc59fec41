use shared::domain::{Product, RoutineProduct};

pub const ROUTINE_SYSTEM_PROMPT: &str = "You are a helpful beauty expert. Generate a clear, step-by-step routine using the provided products. Only discuss skincare, haircare, makeup, fragrance, or related topics. Do not include who the products are from when naming products picked by the user.";

pub const FOLLOW_UP_SYSTEM_PROMPT: &str = "You are a helpful beauty expert. Only answer questions about the generated routine, skincare, haircare, makeup, fragrance, or related topics. Do not include who the products are from when naming products picked by the user.";

pub const ROUTINE_FALLBACK_REPLY: &str = "Sorry, I couldn't generate a routine right now.";
pub const FOLLOW_UP_FALLBACK_REPLY: &str = "Sorry, I couldn't get a response right now.";

pub const EMPTY_SELECTION_GUIDANCE: &str =
    "Please select at least one product to generate a routine.";
pub const REQUEST_IN_FLIGHT_GUIDANCE: &str = "A reply is still on its way; please wait.";

pub const ROUTINE_LOADING: &str = "Generating your routine...";
pub const FOLLOW_UP_LOADING: &str = "Thinking...";

/// The user turn that seeds a routine conversation.
pub fn routine_request(selection: &[Product]) -> serde_json::Result<String> {
    let projected: Vec<RoutineProduct> = selection.iter().map(RoutineProduct::from).collect();
    let products_json = serde_json::to_string(&projected)?;
    Ok(format!(
        "Here are the selected products as JSON: {products_json}. Generate a personalized routine using these products."
    ))
}
