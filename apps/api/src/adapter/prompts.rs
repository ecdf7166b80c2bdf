// All LLM prompt constants for the interview adapter.
// `{role}`, `{difficulty}`, `{question}`, `{answer}` and `{transcript}` are
// replaced before sending.

pub const EXTRACT_SYSTEM: &str = "You are a precise resume data extractor.";

pub const EXTRACT_PROMPT: &str = r#"Extract the candidate's name, email address and phone number from the attached resume.
If a field cannot be found, set its value to "N/A".

Return a JSON object with this EXACT schema:
{"name": "string", "email": "string", "phone": "string"}"#;

pub const GENERATE_SYSTEM: &str =
    "You are an experienced technical interviewer preparing a structured interview.";

pub const GENERATE_PROMPT_TEMPLATE: &str = r#"Generate 6 technical interview questions for a {role} position.

Requirements, in this exact order:
1-2: Easy questions (fundamental concepts, basic syntax, simple problem-solving)
3-4: Medium questions (intermediate concepts, practical scenarios, design patterns)
5-6: Hard questions (advanced concepts, system design, complex problem-solving, optimization)

Each question should be clear, specific, and answerable in a few minutes.

Return a JSON array of exactly 6 objects:
[{"level": "Easy" | "Medium" | "Hard", "text": "string"}]"#;

pub const SCORE_SYSTEM_TEMPLATE: &str = r#"You are an expert technical interviewer evaluating answers for a {role} position.

SCORING CRITERIA:
1. Technical Accuracy (40%): Is the answer technically correct?
2. Depth of Understanding (30%): Deep knowledge or surface-level understanding?
3. Clarity & Communication (15%): Is the answer well-structured?
4. Practical Application (15%): Does it show real-world experience?

SCORING SCALE:
- 90-100: Exceptional answer with deep understanding and practical insight
- 75-89: Strong answer with good technical knowledge
- 60-74: Adequate answer covering basics but lacking depth
- 40-59: Weak answer with significant gaps
- 0-39: Poor, incorrect or missing answer

DIFFICULTY ADJUSTMENTS:
- Easy questions: competent candidates usually score 70-90
- Medium questions: competent candidates usually score 60-80
- Hard questions: competent candidates usually score 50-75

Give constructive, specific feedback covering strengths and improvements."#;

pub const SCORE_PROMPT_TEMPLATE: &str = r#"QUESTION DIFFICULTY: {difficulty}
QUESTION: {question}

CANDIDATE'S ANSWER: {answer}

Return a JSON object with this EXACT schema:
{"score": number from 0 to 100, "feedback": "string"}"#;

pub const SUMMARY_SYSTEM_TEMPLATE: &str = r#"You are a hiring manager reviewing a {role} interview. Provide:
1. A final overall score (0-100) that weighs all questions appropriately
2. A summary of 3-4 sentences covering overall performance and key strengths,
   areas that need improvement, and a hiring recommendation
   (Strong Hire / Hire / Maybe / No Hire)"#;

pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"INTERVIEW TRANSCRIPT:

{transcript}

Return a JSON object with this EXACT schema:
{"final_score": number from 0 to 100, "final_summary": "string"}"#;
