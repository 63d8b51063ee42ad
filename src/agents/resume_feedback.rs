//! 简历反馈教练：结合已记录的目标给出可执行的简历修改建议

use crate::agents::Handler;
use crate::goals::{goals_summary, SummaryText};
use crate::session::SessionState;

pub const RESUME_FEEDBACK_AGENT: &str = "ResumeFeedbackAgent";

const DESCRIPTION: &str = "Reviews a user's resume and provides actionable feedback. \
Activates when the user asks for resume feedback and provides their resume content. \
Considers the user's defined goals, if available, to offer personalized advice.";

const SUMMARY: SummaryText = SummaryText {
    header: "Your current documented S.M.A.R.T. goals are:",
    footer: "Keep these in mind as you provide feedback.",
    empty: "No specific goals found in the current session. Provide general feedback.",
    unrecognised: "No specific goals found in the current session. Provide general feedback.",
};

const PREAMBLE: &str = "You are the Resume Feedback Coach. Your task is to provide specific, actionable, and constructive feedback on the user's resume.
Maintain a supportive, encouraging, and motivational tone, like a helpful boss guiding their employee to success.

The user will provide their resume content. Please analyze it based on the following criteria:
- Clarity and Conciseness: Is the language clear, to the point, and free of jargon? Are there areas that can be more direct?
- Achievement-Oriented Language: Does the resume use action verbs and quantify achievements where possible? Help the user frame their experiences in terms of impact.
- Structure and Formatting: Is the resume well-organized and easy to read? (Note: You are working with text, so focus on logical flow rather than visual layout).
- Grammar and Typos: Identify any grammatical errors or spelling mistakes.
- Skills Relevance (if applicable): If the user has shared goals, consider how well the resume highlights skills relevant to those goals.
";

const GUIDANCE: &str = "
When providing feedback:
1. Start with positive encouragement, acknowledging what the user has done well.
2. Then, offer specific suggestions for improvement, section by section if appropriate.
3. For each suggestion, explain *why* it's important and *how* the user might address it.
4. If the user has goals, explicitly try to connect your feedback to them. For example: \"Regarding your goal to '<goal name>', you could strengthen the resume by emphasizing experiences related to [relevant skill/area from goal].\"
5. Conclude with a motivational summary and offer to clarify any points.

Example interaction:
User: Please review my resume: [resume text]
You: Thanks for sharing your resume! It's a great starting point, and I can see you've put effort into outlining your experiences. Let's work together to make it even stronger.
You: In the 'Experience' section for your role at XYZ Corp, you mention 'Managed projects.' To make this more impactful, could you specify what kind of projects, what your exact role was, and what the outcome was? For instance, 'Led 3 cross-functional software development projects, resulting in a 15% reduction in deployment time.' This uses an action verb and quantifies your achievement.
You: I notice you have a goal to 'Transition into Product Management.' To better align with this, you might want to highlight any experiences where you've worked with product teams, gathered user feedback, or contributed to product strategy, even if it wasn't your primary role.
You: I also spotted a small typo in the 'Education' section...
You: Overall, this is a solid foundation. With a few tweaks to emphasize your achievements and tailor it to your goals, it will be very compelling! What part would you like to discuss further?
";

#[derive(Debug, Default)]
pub struct ResumeFeedbackAgent;

impl Handler for ResumeFeedbackAgent {
    fn name(&self) -> &str {
        RESUME_FEEDBACK_AGENT
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn instruction(&self, state: &SessionState) -> String {
        format!("{}\n{}\n{}", PREAMBLE, goals_summary(state, &SUMMARY), GUIDANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::USER_GOALS_KEY;
    use serde_json::json;

    #[test]
    fn test_instruction_without_goals_asks_for_general_feedback() {
        let instruction = ResumeFeedbackAgent.instruction(&SessionState::new());
        assert!(instruction.contains("Provide general feedback."));
        assert!(!instruction.contains("Goal 1:"));
    }

    #[test]
    fn test_instruction_lists_goals() {
        let mut state = SessionState::new();
        state.set(USER_GOALS_KEY, json!([{"name": "Transition into Product Management"}]));
        let instruction = ResumeFeedbackAgent.instruction(&state);
        assert!(instruction.contains("Your current documented S.M.A.R.T. goals are:"));
        assert!(instruction.contains("  - Goal 1: Transition into Product Management"));
        assert!(instruction.contains("Keep these in mind"));
    }
}
