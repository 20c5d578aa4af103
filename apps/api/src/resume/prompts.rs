// Resume analysis LLM prompt templates.
// All prompts for the resume module are defined here.

pub const EXPERIENCE_TEMPERATURE: f32 = 0.2;
pub const SUGGESTION_TEMPERATURE: f32 = 0.7;

pub const EXPERIENCE_YEARS_PROMPT: &str = r#"Today's date is {today}.

You are a helpful assistant that estimates professional experience. Only count internships, full-time jobs, or paid technical work. Do **not** count personal projects or coursework.

If the experience doesn't specify an end date and says "present", assume it ends today ({today}).

Sum the durations of all qualifying experiences **in months**, then convert to **years by dividing by 12** and rounding down to the nearest whole number.

Return a single number only, with no extra text.

Here is the resume:
"""
{resume_text}
"""

How many **years** of professional experience does this person have relevant to the job title: "{job_title}"?"#;

pub const SUGGEST_TITLES_PROMPT: &str = r#"Based on the following resume, suggest 5 job titles that best match the candidate's skills and experience.
Provide only the job titles as a comma-separated list.

Resume:
"""
{resume_text}
""""#;

pub const TITLE_REASONS_PROMPT: &str = r#"Based on the following resume, provide a 1-2 sentence explanation for why the candidate should consider each of the following job titles.
Use bullet points and keep the explanations concise.

Resume:
"""
{resume_text}
"""

Job Titles:
{job_titles}"#;

pub const SUGGEST_TITLES_WITH_REASONS_PROMPT: &str = r#"Based on the following resume, suggest 5 job titles that best match the candidate's skills and experience.
For each job title, provide a 1-2 sentence explanation for why the candidate should consider it.
Use the following format:
- Job Title: Explanation

Resume:
"""
{resume_text}
""""#;
