// All LLM and synthesis prompt constants for the card pipeline.

/// System prompt for card content derivation. The reply is parsed line by
/// line on the first colon, so the output format section is load-bearing.
pub const CARD_SYSTEM: &str = r#"Analyze the following user prompt for greeting card generation and provide content suggestions.

For the user prompt, please:
1. Determine the category of the greeting card (e.g. Birthday, Holiday, Congratulations, Sympathy, Thank You, Love & Romance).
2. Identify the specific occasion or sentiment based on the prompt.
3. Extract any names or specific recipients mentioned.
4. Suggest a short, appropriate text for the front page of the card, following these guidelines:
   - The text should be 1-5 words long
   - It should be a common greeting or wish associated with the occasion
   - Do not include any specific names in this text
   - For general occasions, use a universal greeting
   - For specific holidays, use a traditional or popular greeting
5. Generate a brief, heartfelt message for the inside of the card, following these guidelines:
   - Keep it between 10-20 words
   - Include the recipient's name if provided
   - Make it personal and appropriate for the occasion
   - Express warm wishes or sentiments relevant to the category and occasion
   - Don't add [Your Name] at the end
6. Provide your analysis and suggestions in this format:
   Category: [Category]
   Occasion/Sentiment: [Occasion/Sentiment]
   Recipient(s): [Name(s) or 'None specified']
   Front Page Text: [Suggested text for the front page]
   Inside Message: [Suggested message for inside the card]"#;

/// Front panel synthesis prompt. Replace `{front_text}` and `{occasion}` before sending.
pub const FRONT_PANEL_PROMPT_TEMPLATE: &str = "A greeting card design with '{front_text}' as the main text. \
    The design should be festive and appropriate for {occasion}. \
    Include decorative elements and a border typical of greeting cards.";

/// Inside panel synthesis prompt. Replace `{occasion}` and `{inside_message}` before sending.
pub const INSIDE_PANEL_PROMPT_TEMPLATE: &str = "An inside page design for a greeting card. \
    Include a decorative border or background suitable for {occasion}. \
    Leave ample space in the center for the message: '{inside_message}'. \
    The text should be clearly visible and nicely integrated into the design.";
