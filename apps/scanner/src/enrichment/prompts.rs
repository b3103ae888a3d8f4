// Enrichment prompt templates.
// All prompts for the enrichment module are defined here.

pub const RESUME_ENRICH_SYSTEM: &str = "\
You are an intelligent resume parser. \
Read the resume text and report the candidate's contact details, skills and experience.";

/// Replace `{known_skills}` and `{resume_text}` before sending.
pub const RESUME_ENRICH_PROMPT: &str = r#"Extract the following fields from the resume content:
- Full Name
- Email Address
- Phone Number
- List of Skills (as an array)
- The work or professional experience section as plain text
- A one-sentence professional summary of the candidate

Skills already detected (you may add others that appear in the text): {known_skills}

Respond with a JSON object with this EXACT schema:
{
  "name": "",
  "email": "",
  "phone": "",
  "skills": [],
  "experience": "",
  "summary": ""
}

Resume content:
"""
{resume_text}
""""#;
