//! Skill coach agent, the conversational front door.
//!
//! Classifies each user message into an intent (model first, keyword
//! fallback) and answers with coordination messages that point the client
//! at the assessor or matcher flows. All model calls degrade to static
//! text, so the coach works fully offline.

use std::sync::Arc;

use async_trait::async_trait;
use coach_core::intent::classify_keywords;
use coach_core::{AgentKind, AgentRequest, AgentResponse, Capability, Intent};
use serde_json::{json, Value};
use tracing::warn;

use crate::llm::{analyze_intent, ChatMessage, CompletionOptions, IntentAnalysis, TextCompletion};
use crate::runtime::{Agent, AgentCore};

const WELCOME_MESSAGE: &str = "Hello! I'm your AI Learning Assistant, and I'm here to help you discover and develop your skills. \n\nI work with a team of specialized AI agents to provide you with:\n\n🎯 **Skill Assessment**: I can evaluate your current competency and capability levels across various domains\n📚 **Course Recommendations**: I'll match you with the most relevant courses based on your skill gaps and learning goals\n🚀 **Learning Guidance**: I'll help you create personalized learning paths and achieve your career objectives\n\n**How can I help you today?**\n- Type \"assess my skills\" to take a skill evaluation\n- Ask for \"course recommendations\" to discover learning opportunities\n- Say \"help me learn\" for learning strategy guidance\n\nWhat would you like to start with?";

const ASSESSMENT_FALLBACK: &str = "📊 **Skill Assessor Agent activated**\n\nI'll help you evaluate your current skills across two key dimensions:\n\n**Competency (Knowledge & Learning):**\n• Ability to explain concepts to others\n• Problem-solving effectiveness\n• Independence in application\n• Adaptability to new contexts\n• Recognition as a knowledge source\n\n**Capability (Experience & Application):**\n• Years of relevant experience\n• Consistency in real workplace conditions\n• Performance under pressure\n• Exposure across diverse scenarios\n• Frequency of professional application\n\nThe assessment uses a 4-point scale: 0=Foundational, 1=Intermediate, 2=Advanced, 3=Mastery. Your responses will be plotted on a 2D map to identify your skill profile and recommend appropriate learning paths.\n\nReady to start your skill assessment?";

const COURSE_FALLBACK: &str = "📚 **Course Matcher Agent activated**\n\nBased on your interests, I've curated some learning recommendations. These courses are selected based on current industry demands and career progression paths.\n\nI can also create a personalized learning plan once you complete the skill assessment. This will help me recommend courses that specifically target your skill gaps and learning objectives.\n\n**Available Course Categories:**\n• Technology & Programming\n• Data Science & Analytics\n• Business & Management\n• Creative & Design\n• Health & Wellness\n\nWhat type of skills are you most interested in developing?";

const GUIDANCE_MESSAGE: &str = "🎯 **Skill Coach Agent activated**\n\nLet me help you plan your career development journey. I've created a career planning framework to guide your learning path.\n\nTo give you the best guidance, I'd like to understand:\n• Your current role and experience level\n• Your target career goals\n• Your preferred timeline for advancement\n• Your available time for learning\n\n**Learning Strategy Framework:**\n1. **Assess Current State** - Understand your skill baseline\n2. **Define Goals** - Set clear, measurable learning objectives\n3. **Identify Gaps** - Find the difference between current and target skills\n4. **Create Plan** - Design a structured learning pathway\n5. **Execute & Track** - Follow the plan and monitor progress\n\nWhat position are you aiming to reach in the next 2-3 years?";

const HELP_MESSAGE: &str = "I can help you with:\n\n🎯 **Skill Assessment** - Evaluate your current competency and capability levels\n📚 **Course Recommendations** - Find relevant courses based on your skill gaps\n🚀 **Learning Guidance** - Create personalized learning paths and career planning\n\nTry saying:\n• \"assess my skills\" to start an evaluation\n• \"recommend courses\" to discover learning opportunities\n• \"help me learn\" for learning strategy guidance\n\nWhat would you like to explore?";

const GREETING_MESSAGE: &str = "Hello! I'm your AI Learning Assistant. I'm here to help you discover and develop your skills through personalized assessments and course recommendations. How can I assist you today?";

const GETTING_STARTED_MESSAGE: &str = "I understand you're interested in learning and skill development. Let me help you get started:\n\n• For **skill evaluation**, say \"assess my skills\"\n• For **course recommendations**, ask \"what courses should I take?\"\n• For **learning guidance**, say \"help me plan my learning\"\n\nWhich area would you like to focus on first?";

fn general_suggestions() -> Value {
    json!([
        "assess my skills",
        "recommend courses",
        "help me learn",
        "set learning goals",
    ])
}

pub struct CoachAgent {
    core: AgentCore,
    llm: Arc<dyn TextCompletion>,
}

impl CoachAgent {
    pub fn new(llm: Arc<dyn TextCompletion>) -> Self {
        let capabilities = vec![
            Capability::new(
                "user_interaction",
                "Handle primary user conversations and queries",
                &["user_message", "conversation_start"],
                &["bot_response", "conversation_flow"],
            ),
            Capability::new(
                "agent_orchestration",
                "Coordinate with other agents for specialized tasks",
                &["assessment_request", "course_request"],
                &["agent_coordination", "synthesized_response"],
            ),
            Capability::new(
                "session_management",
                "Manage user session state and conversation history",
                &["session_data", "state_update"],
                &["session_state", "conversation_context"],
            ),
            Capability::new(
                "learning_guidance",
                "Provide learning strategy and goal setting advice",
                &["learning_goals", "skill_profile"],
                &["learning_plan", "goal_recommendations"],
            ),
        ];
        Self {
            core: AgentCore::new(AgentKind::SkillCoach, capabilities),
            llm,
        }
    }

    fn message_text(request: &AgentRequest) -> String {
        request.payload["message"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    async fn handle_user_message(&self, request: &AgentRequest) -> AgentResponse {
        let message = Self::message_text(request);

        match analyze_intent(self.llm.as_ref(), &message).await {
            Ok(analysis) => match analysis.intent {
                Intent::SkillAssessment => self.coordinate_assessment(request).await,
                Intent::CourseRecommendation => self.coordinate_courses(request).await,
                Intent::LearningGuidance => self.learning_guidance(request),
                Intent::Greeting | Intent::HelpRequest | Intent::GeneralConversation => {
                    self.enhanced_general_response(request, &analysis).await
                }
            },
            Err(e) => {
                warn!("intent analysis failed, falling back to keyword matching: {e}");
                match classify_keywords(&message) {
                    Intent::SkillAssessment => self.coordinate_assessment(request).await,
                    Intent::CourseRecommendation => self.coordinate_courses(request).await,
                    Intent::LearningGuidance => self.learning_guidance(request),
                    _ => self.general_response(request),
                }
            }
        }
    }

    fn conversation_start(&self, request: &AgentRequest) -> AgentResponse {
        self.core.ok_response(
            request,
            "conversation_start_response",
            json!({
                "message": WELCOME_MESSAGE,
                "agent": self.core.kind(),
                "capabilities": self.core.capabilities(),
                "suggested_actions": general_suggestions(),
            }),
        )
    }

    async fn coordinate_assessment(&self, request: &AgentRequest) -> AgentResponse {
        let user_message = Self::message_text(request);
        let context = format!(
            "You are a skill development coach introducing a comprehensive skill assessment. \
             The user said: \"{user_message}\". \
             Explain the assessment in an encouraging, personalized way that addresses their specific interest. \
             Mention that the assessment evaluates both Competency (knowledge/learning) and Capability (experience/application) \
             on a 4-point scale (0=Foundational, 1=Intermediate, 2=Advanced, 3=Mastery). \
             Keep it concise but motivating."
        );
        let messages = [ChatMessage::system(context), ChatMessage::user(&user_message)];

        let message = match self
            .llm
            .generate(&messages, &CompletionOptions::default())
            .await
        {
            Ok(completion) => format!(
                "📊 **Skill Assessment Ready**\n\n{}\n\n**Assessment Framework:**\n• **Competency (Knowledge & Learning):** Problem-solving, adaptability, teaching ability\n• **Capability (Experience & Application):** Real-world experience, consistency, performance under pressure\n\nReady to discover your skill profile?",
                completion.content
            ),
            Err(e) => {
                warn!("assessment introduction failed, using fallback: {e}");
                ASSESSMENT_FALLBACK.to_string()
            }
        };

        self.core.ok_response(
            request,
            "assessment_coordination",
            json!({
                "message": message,
                "agent": self.core.kind(),
                "trigger_assessment": true,
                "right_panel_content": {
                    "type": "skill_assessment",
                    "title": "Interactive Skill Assessment",
                    "description": "Complete this 10-question assessment to understand your current skill levels",
                },
                "suggestions": [
                    "Start the assessment",
                    "Learn more about the framework",
                    "Skip to course recommendations",
                ],
            }),
        )
    }

    async fn coordinate_courses(&self, request: &AgentRequest) -> AgentResponse {
        let user_message = Self::message_text(request);
        let context = format!(
            "You are a skill development coach introducing course recommendations. \
             The user said: \"{user_message}\". \
             Provide a personalized, encouraging response about finding the right courses for their goals. \
             Mention that you have access to 761 real courses across multiple categories. \
             Keep it concise and motivating."
        );
        let messages = [ChatMessage::system(context), ChatMessage::user(&user_message)];

        let message = match self
            .llm
            .generate(&messages, &CompletionOptions::default())
            .await
        {
            Ok(completion) => format!(
                "📚 **Course Matcher Agent Ready**\n\n{}\n\n**Our Course Database:**\n✅ 761 real courses from top providers\n✅ Multiple skill levels and career paths\n✅ Industry-aligned learning objectives\n\n**Popular Categories:**\n• Technology & Programming\n• Data Science & Analytics\n• Business & Management\n• Creative & Design\n• Health & Wellness\n\nWhat skills would you like to develop?",
                completion.content
            ),
            Err(e) => {
                warn!("course introduction failed, using fallback: {e}");
                COURSE_FALLBACK.to_string()
            }
        };

        self.core.ok_response(
            request,
            "course_coordination",
            json!({
                "message": message,
                "agent": self.core.kind(),
                "right_panel_content": {
                    "type": "course_browser",
                    "title": "Browse 761+ Courses",
                    "description": "Explore our comprehensive course database",
                },
                "suggestions": [
                    "Show me technology courses",
                    "Find data science courses",
                    "Recommend courses for my skill level",
                    "Create a learning path",
                ],
            }),
        )
    }

    fn learning_guidance(&self, request: &AgentRequest) -> AgentResponse {
        self.core.ok_response(
            request,
            "learning_guidance",
            json!({
                "message": GUIDANCE_MESSAGE,
                "agent": self.core.kind(),
                "right_panel_content": {
                    "type": "career_planning",
                    "title": "Career Development Framework",
                    "current_level": "To be determined",
                    "target_level": "To be specified",
                    "timeline": "2-3 years",
                },
                "content_type": "planning",
            }),
        )
    }

    async fn enhanced_general_response(
        &self,
        request: &AgentRequest,
        analysis: &IntentAnalysis,
    ) -> AgentResponse {
        let user_message = Self::message_text(request);
        let context = format!(
            "You are a helpful skill development coach. The user said: \"{user_message}\". \
             Intent: {} (confidence {:.2}). \
             Provide a helpful, encouraging response that guides them toward skill assessment or course recommendations. \
             Keep the response concise and actionable.",
            analysis.intent.as_str(),
            analysis.confidence
        );
        let messages = [ChatMessage::system(context), ChatMessage::user(&user_message)];

        match self
            .llm
            .generate(&messages, &CompletionOptions::default())
            .await
        {
            Ok(completion) => self.core.ok_response(
                request,
                "enhanced_general_response",
                json!({
                    "message": completion.content,
                    "agent": self.core.kind(),
                    "intent": analysis.intent,
                    "confidence": analysis.confidence,
                    "suggestions": [
                        "Take a skill assessment to identify learning opportunities",
                        "Explore course recommendations based on your goals",
                        "Ask for specific learning guidance in any skill area",
                    ],
                }),
            ),
            Err(e) => {
                warn!("enhanced response generation failed, using canned reply: {e}");
                self.general_response(request)
            }
        }
    }

    fn general_response(&self, request: &AgentRequest) -> AgentResponse {
        let message = Self::message_text(request).to_lowercase();

        let text = if message.contains("hello") || message.contains("hi") {
            GREETING_MESSAGE
        } else if message.contains("help") {
            HELP_MESSAGE
        } else {
            GETTING_STARTED_MESSAGE
        };

        self.core.ok_response(
            request,
            "general_response",
            json!({
                "message": text,
                "agent": self.core.kind(),
                "suggestions": general_suggestions(),
            }),
        )
    }
}

#[async_trait]
impl Agent for CoachAgent {
    fn core(&self) -> &AgentCore {
        &self.core
    }

    async fn dispatch(&self, request: &AgentRequest) -> eyre::Result<Option<AgentResponse>> {
        let response = match request.request_type.as_str() {
            "user_message" => self.handle_user_message(request).await,
            "conversation_start" => self.conversation_start(request),
            "assessment_request" => self.coordinate_assessment(request).await,
            "course_request" => self.coordinate_courses(request).await,
            "learning_guidance" => self.learning_guidance(request),
            _ => return Ok(None),
        };
        Ok(Some(response))
    }
}
