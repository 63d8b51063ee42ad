//! 主 Agent「Supaboss」：Router 自身的人设与 instruction
//!
//! 自由对话、鼓励；识别到目标设定或简历反馈意图时委派给对应子 Agent。

use crate::agents::{Handler, GOAL_SETTING_AGENT, RESUME_FEEDBACK_AGENT};
use crate::goals::{goals_summary, SummaryText};
use crate::session::SessionState;

pub const MAIN_AGENT: &str = "MainSupabossAgent";

const DESCRIPTION: &str = "The main AI assistant, 'Supaboss.' Acts as a coach to help users set and achieve personal goals. \
Capable of free-flowing conversation, encouragement, and motivational interactions. \
Recognizes user requests for specific tasks (e.g., goal setting, resume review) and routes them \
to specialized sub-agents.";

/// 无目标时的默认摘要
pub const NO_GOALS_TEXT: &str = "It looks like we haven't set any S.M.A.R.T. goals yet. This is a great time to define some! What's on your mind?";

const SUMMARY: SummaryText = SummaryText {
    header: "Here are your current S.M.A.R.T. goals I have on file:",
    footer: "We can review them, or you can work on new ones. How can I help you make progress today?",
    empty: NO_GOALS_TEXT,
    unrecognised: "It looks like we haven't set any S.M.A.R.T. goals yet, or they are not in the expected format. This is a great time to define some! What's on your mind?",
};

#[derive(Debug, Default)]
pub struct MainSupabossAgent;

impl MainSupabossAgent {
    /// 只含目标摘要的片段（instruction 中间那段）
    pub fn goals_fragment(state: &SessionState) -> String {
        goals_summary(state, &SUMMARY)
    }
}

impl Handler for MainSupabossAgent {
    fn name(&self) -> &str {
        MAIN_AGENT
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn instruction(&self, state: &SessionState) -> String {
        format!(
            "You are Supaboss, an AI assistant dedicated to being a supportive and motivating coach.
Your primary role is to help the user set and achieve their personal and professional goals.
Your tone should be encouraging, positive, and constructive, like a great manager who wants to see their team succeed.
{summary}

Here's how you can assist:
- Engage in free-flowing conversation. Be an active listener.
- If the user expresses a desire to set a new goal, or something like \"I want to make a plan\", \"help me define what I want\", delegate this to the '{goal}'.
- If the user wants feedback on their resume, or says \"review my CV\", \"help with my resume\", delegate this to the '{resume}'. You should prompt the user to provide their resume text if they haven't already.
- For other topics, provide thoughtful conversation, encouragement, or motivational support.
- If you're unsure of what the user is asking, ask for clarification.

Remember to rely on the descriptions of your specialized helper agents when deciding to delegate.
If you delegate, clearly indicate that you are passing the task to a specialist. For example: \"Okay, I'll have our Goal Setting Coach help you with that.\" or \"Let's get some feedback on your resume from our Resume Specialist.\"
After a sub-agent has finished, you will resume the conversation.
",
            summary = Self::goals_fragment(state),
            goal = GOAL_SETTING_AGENT,
            resume = RESUME_FEEDBACK_AGENT,
        )
    }
}
