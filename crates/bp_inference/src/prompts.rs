use serde::Serialize;

use bp_core::Result;

/// Keyword research plus a full article, answered as a single JSON object.
pub fn draft_prompt(keyword: &str) -> String {
    format!(
        r#"You are an advanced SEO keyword intelligence system.

User keyword: "{keyword}"

==============================
PART 1: TREND ANALYSIS
==============================

Produce three lists of realistic search terms related to the user keyword:

1) TRENDING_STYLE_KEYWORDS (4-6 items): seasonal patterns, social trends and
   industry updates of the current year. No news reporting.
2) LONG_TAIL_KEYWORDS (4-6 items): phrases of 4-7 words with strong user
   intent (how, best, for beginners, near me).
3) QUESTION_BASED_QUERIES (4-6 items): "people also ask" style questions
   starting with how, what, why, is, can or should.

Every term must stay related to the user keyword. No medical, legal,
political or adult content.

==============================
PART 2: PRIMARY KEYWORD
==============================

Pick one PRIMARY_KEYWORD with the highest search intent that is clear,
valuable, aligned with the user keyword and not clickbait.

==============================
PART 3: ARTICLE
==============================

Using the PRIMARY_KEYWORD, write:

- an <h1> title
- 600-900 words of SEO-friendly HTML with <h2> and <h3> headings
- short paragraphs (at most 4 lines) with examples, steps and tips
- a 20-30 word excerpt
- a clean text version of the article without any HTML

==============================
RETURN FORMAT
==============================

Return ONLY valid JSON:

{{
  "primaryKeyword": "",
  "trendingKeywords": [],
  "longTailKeywords": [],
  "questionKeywords": [],
  "title": "",
  "excerpt": "",
  "content": "",
  "cleanText": ""
}}

NO markdown. NO explanation. NO extra text.
"#
    )
}

/// Copy-edit pass over an existing draft, embedded verbatim as JSON.
pub fn refine_prompt<T: Serialize>(draft: &T) -> Result<String> {
    let draft = serde_json::to_string_pretty(draft)?;
    Ok(format!(
        r#"You are an expert editor for SEO blog content.

Below is a DRAFT blog in JSON format:

{draft}

====================
YOUR TASK
====================
- Fix grammar, spelling and punctuation
- Improve flow and readability
- Make it more engaging and modern
- Keep the HTML in "content" valid
- Keep "cleanText" as plain text without HTML
- Do NOT change the topic or the meaning
- Keep the intent of the title and the excerpt

====================
RETURN FORMAT
====================
Return ONLY the corrected JSON with this structure:

{{
  "title": "",
  "excerpt": "",
  "content": "",
  "cleanText": ""
}}

NO markdown, NO explanation, NO extra text.
"#
    ))
}
