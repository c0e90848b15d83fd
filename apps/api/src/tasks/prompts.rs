// System prompts and user prompt templates for every task kind.
// The schema described in each system prompt is a hint to the model only;
// the normalizers are what actually enforce result shapes.

/// System prompt for interview question generation.
pub const QUESTIONS_SYSTEM: &str = "You are an expert in coming up with follow up questions \
    to uncover deeper insights for a structured voice interview. \
    Questions must be open-ended, specific to the interview objective and \
    answerable in under two minutes. \
    Respond with a JSON object of the form \
    {\"questions\": [{\"question\": \"...\", \"type\": \"...\"}], \"description\": \"...\"} \
    where `description` is a two-sentence summary of the interview shown to candidates.";

/// Replace: {name}, {objective}, {number}, {question_types}, {description}
pub const QUESTIONS_PROMPT_TEMPLATE: &str = r#"Generate interview questions for the interview below.

Interview title: {name}
Interview objective: {objective}
Number of questions to generate: {number}
Question types to cover: {question_types}

Additional context from the interviewer:
{description}

Rules:
1. Return exactly {number} questions.
2. Every question object MUST carry a `type` chosen from the question types above.
3. Do not repeat or trivially rephrase a question.
4. Avoid yes/no questions."#;

/// System prompt for insight generation across all calls of one interview.
pub const INSIGHTS_SYSTEM: &str = "You are an expert at analyzing interview call summaries \
    and extracting insights that help the interviewer improve their hiring decisions. \
    Respond with a JSON object of the form {\"insights\": [\"...\", \"...\", \"...\"]}. \
    Each insight is one sentence of at most 25 words.";

/// Replace: {name}, {objective}, {description}, {call_summaries}
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"Interview title: {name}
Interview objective: {objective}
Interview description: {description}

Call summaries of every candidate interviewed so far:
{call_summaries}

Produce 3 insights about the candidate pool as a whole: recurring strengths, recurring gaps and anything the interviewer should change about the interview."#;

/// System prompt for per-response analytics.
pub const ANALYTICS_SYSTEM: &str = r#"You are an expert interviewer evaluating a single candidate from the transcript of a voice interview.

Return a JSON object with this EXACT schema:
{
  "overallScore": 0,
  "overallFeedback": "",
  "communication": {"score": 0, "feedback": ""},
  "questionSummaries": [{"question": "", "summary": ""}],
  "softSkillSummary": ""
}

Scoring rubric:
- overallScore: integer 0-100 reflecting how well the candidate met the interview objective.
- communication.score: integer 0-10 for clarity, structure and fluency.
- questionSummaries: one entry per main interview question, in the order given. If the question was not asked, say so in the summary.
- softSkillSummary: 2-3 sentences on confidence, adaptability and collaboration."#;

/// Replace: {transcript}, {main_questions}
pub const ANALYTICS_PROMPT_TEMPLATE: &str = r#"Transcript of the interview:
{transcript}

Main interview questions:
{main_questions}

Evaluate the candidate following the rubric in your instructions."#;

/// System prompt for communication skill analysis.
pub const COMMUNICATION_SYSTEM: &str = r#"You are an expert in analyzing communication skills from interview transcripts.

Return a JSON object with this EXACT schema:
{
  "score": 0,
  "feedback": "",
  "areas": {
    "clarity": "",
    "structure": "",
    "vocabulary": "",
    "listening": ""
  },
  "supportingQuotes": [{"quote": "", "analysis": "", "type": "strength"}]
}

score is an integer 0-10. Each supporting quote is a verbatim excerpt of the candidate's speech, with `type` either "strength" or "improvement_area"."#;

/// Replace: {transcript}
pub const COMMUNICATION_PROMPT_TEMPLATE: &str = r#"Analyze the communication skills of the candidate in the following transcript:

{transcript}"#;
