use crate::llm::ToolDeclaration;

use super::ResearchRequest;

pub const SYSTEM_INSTRUCTION: &str = "You are an expert startup market research analyst. \
Analyze the market research query and provide:
1. Market Overview (2-3 paragraphs)
2. Competitor Analysis Table (markdown format with columns: Company, Website, Pricing, Key Features, Target Market, USP)
3. Customer Pain Points (bullet list)
4. Strategic Recommendations (3-5 specific, actionable recommendations)
5. Pitch Deck Outline (5 key slides with titles and 2-3 bullet points each)

Be specific, data-driven, and actionable. Format your response with clear sections using markdown headers.";

/// Sent back for every tool invocation. The search itself runs on the
/// service side, so the result only acknowledges completion.
pub const TOOL_ACKNOWLEDGEMENT: &str =
    "Web search completed. Please analyze the results and provide the research report.";

pub const WEB_SEARCH_TOOL_TYPE: &str = "web_search_20250305";
pub const WEB_SEARCH_TOOL_NAME: &str = "web_search";

pub const PRESET_QUERIES: [&str; 3] = [
    "Find top 5 competitors and compare pricing & features",
    "Summarize customer pain points from reviews and blogs",
    "Suggest a unique positioning strategy for our startup",
];

pub fn user_message(request: &ResearchRequest) -> String {
    format!(
        "Startup Description: {}\n\n\
        Research Query: {}\n\n\
        Please conduct comprehensive market research and provide detailed insights following the structure outlined.",
        request.subject_description, request.query
    )
}

pub fn web_search_tool() -> ToolDeclaration {
    ToolDeclaration {
        tool_type: WEB_SEARCH_TOOL_TYPE.to_string(),
        name: WEB_SEARCH_TOOL_NAME.to_string(),
    }
}
