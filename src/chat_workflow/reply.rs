use crate::chat_workflow::sanitize::SanitizedQuery;
use crate::listings::ListingSummary;
use crate::reference::POLICY_FACTS;

pub const REFUSAL_REPLY: &str = "I'm sorry, but I can't help with that request. I'm here to help you find cars, explain our dealership policies, or troubleshoot car problems. Is there anything car-related I can help you with?";

pub const BUDGET_CLARIFICATION_REPLY: &str = "I'd love to help you find an affordable car! To give you the best options, could you tell me a bit more: What is your maximum budget? Which fuel type do you prefer (petrol, diesel, electric, hybrid or CNG)? What body type suits you (sedan, SUV, hatchback, MPV/van, pickup...)? Do you have a brand or model in mind?";

pub fn no_results_reply(query: &SanitizedQuery, currency: &str) -> String {
    let named = query
        .make
        .as_ref()
        .or(query.model.as_ref())
        .map(|pattern| pattern.needle());

    if let Some(name) = named {
        return format!(
            "Sorry, we don't have any verified {} cars in our inventory that match your request right now. New listings arrive regularly, so please check back soon, or let me know if you'd like to see similar cars from other brands.",
            name
        );
    }

    if let Some(max) = query.price.as_ref().and_then(|range| range.lte) {
        return format!(
            "Sorry, I couldn't find any cars matching your criteria under {} {}. You could try increasing your budget a little or relaxing some of the other requirements, and I'll search again.",
            max, currency
        );
    }

    "Sorry, I couldn't find any cars matching your criteria right now. Try adjusting your filters, for example a different body type, fuel type or price range, and I'll search again.".to_string()
}

pub fn recommendation_prompt(
    message: &str,
    listings: &[ListingSummary],
    currency: &str,
    bot_name: &str,
) -> String {
    let data = serde_json::to_string_pretty(listings).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are {bot_name}, a friendly sales assistant for a car marketplace.

The user asked: "{message}"

These are the ONLY matching cars in our inventory (JSON data):
{data}

Write a recommendation for the user based strictly on these cars.
Rules:
- Write exactly one paragraph: no line breaks, no bullet points, no Markdown.
- At most 150 words.
- Mention only the cars listed above; never invent cars, prices or features.
- Prices are stored in {currency}. Show each price exactly as the numeric value in the data followed by "{currency}". Never convert currencies or units and never rescale the number."#
    )
}

pub fn policy_prompt(message: &str, bot_name: &str) -> String {
    format!(
        r#"You are {bot_name}, a customer service assistant for a car marketplace.
Answer the user's question using only these dealership policies:
{POLICY_FACTS}

If the policies do not cover the question, say so and suggest contacting our support team.
Answer in one short paragraph without Markdown.

User question: "{message}""#
    )
}

pub fn troubleshooting_prompt(message: &str, bot_name: &str) -> String {
    format!(
        r#"You are {bot_name}, a knowledgeable car mechanic assistant.
Help the user diagnose their car problem: list the most likely causes, simple checks they can do safely, and when they should see a professional mechanic.
Keep it under 150 words, in plain text without Markdown.

User problem: "{message}""#
    )
}

pub fn general_prompt(message: &str, bot_name: &str) -> String {
    format!(
        r#"You are {bot_name}, a friendly assistant for a car marketplace where people buy and sell cars.
Reply briefly and helpfully to the user. If it fits, mention that you can help them search for cars, explain our policies, or troubleshoot car problems.
Keep it under 100 words, in plain text without Markdown.

User message: "{message}""#
    )
}

/// Collapses line breaks and runs of whitespace into single spaces
pub fn single_paragraph(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
