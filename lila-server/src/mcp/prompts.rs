//! Prompt templates. Pure formatting; no store access.

use serde::Deserialize;
use serde_json::{Value, json};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    AssessAttachmentStyle,
    AnalyzeEmotionalClimate,
    GenerateSecureResponse,
}

struct PromptArgument {
    name: &'static str,
    description: &'static str,
    required: bool,
}

const fn arg(name: &'static str, description: &'static str, required: bool) -> PromptArgument {
    PromptArgument {
        name,
        description,
        required,
    }
}

impl Prompt {
    pub const ALL: [Prompt; 3] = [
        Prompt::AssessAttachmentStyle,
        Prompt::AnalyzeEmotionalClimate,
        Prompt::GenerateSecureResponse,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Prompt::AssessAttachmentStyle => "assess_attachment_style",
            Prompt::AnalyzeEmotionalClimate => "analyze_emotional_climate",
            Prompt::GenerateSecureResponse => "generate_secure_response",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Prompt::AssessAttachmentStyle => {
                "Determine a persona's attachment style from behavioral observations"
            }
            Prompt::AnalyzeEmotionalClimate => {
                "Evaluate the emotional dynamics and safety level of a conversation"
            }
            Prompt::GenerateSecureResponse => {
                "Create attachment-security-building responses for a scenario"
            }
        }
    }

    fn arguments(&self) -> &'static [PromptArgument] {
        const ASSESS: [PromptArgument; 3] = [
            arg("persona_id", "Persona to assess", true),
            arg("observation_period", "Period covered (default: recent)", false),
            arg("behavioral_examples", "Observed behaviors", false),
        ];
        const CLIMATE: [PromptArgument; 3] = [
            arg("conversation_text", "Conversation to analyze", false),
            arg("interaction_id", "Stored interaction to analyze", false),
            arg("participants", "Who took part", false),
        ];
        const SECURE: [PromptArgument; 4] = [
            arg("scenario_description", "The situation to respond to", true),
            arg("personas", "Participants", true),
            arg("insecurity_triggers", "Known triggers", false),
            arg("growth_goals", "Goals for the exchange", false),
        ];

        match self {
            Prompt::AssessAttachmentStyle => &ASSESS,
            Prompt::AnalyzeEmotionalClimate => &CLIMATE,
            Prompt::GenerateSecureResponse => &SECURE,
        }
    }

    fn descriptor(&self) -> Value {
        let arguments: Vec<Value> = self
            .arguments()
            .iter()
            .map(|a| json!({"name": a.name, "description": a.description, "required": a.required}))
            .collect();
        json!({
            "name": self.name(),
            "description": self.description(),
            "arguments": arguments,
        })
    }

    /// Render the prompt text. Fails when a required argument is absent.
    pub fn render(&self, arguments: Option<Value>) -> Result<String, serde_json::Error> {
        let arguments = arguments.unwrap_or_else(|| json!({}));
        Ok(match self {
            Prompt::AssessAttachmentStyle => {
                assess_attachment_style(&serde_json::from_value(arguments)?)
            }
            Prompt::AnalyzeEmotionalClimate => {
                analyze_emotional_climate(&serde_json::from_value(arguments)?)
            }
            Prompt::GenerateSecureResponse => {
                generate_secure_response(&serde_json::from_value(arguments)?)
            }
        })
    }

    /// `prompts/get` result: the text as a single user message
    pub fn get_result(&self, text: String) -> Value {
        json!({
            "description": self.description(),
            "messages": [{
                "role": "user",
                "content": {"type": "text", "text": text}
            }]
        })
    }
}

pub fn list_result() -> Value {
    let prompts: Vec<Value> = Prompt::ALL.iter().map(Prompt::descriptor).collect();
    json!({ "prompts": prompts })
}

fn default_observation_period() -> String {
    "recent".to_string()
}

#[derive(Debug, Deserialize)]
struct AssessAttachmentStyleArgs {
    persona_id: String,
    #[serde(default = "default_observation_period")]
    observation_period: String,
    #[serde(default)]
    behavioral_examples: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EmotionalClimateArgs {
    conversation_text: String,
    interaction_id: String,
    participants: String,
}

#[derive(Debug, Deserialize)]
struct SecureResponseArgs {
    scenario_description: String,
    personas: String,
    #[serde(default)]
    insecurity_triggers: String,
    #[serde(default)]
    growth_goals: String,
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() { default } else { value }
}

fn assess_attachment_style(args: &AssessAttachmentStyleArgs) -> String {
    format!(
        "You are a psychological researcher specializing in attachment theory. Please analyze the behavioral patterns of persona {persona_id} to determine their attachment style.

ATTACHMENT STYLES TO CONSIDER:
• Secure: Comfortable with intimacy and autonomy, emotionally available, trusting
• Anxious: Seeks closeness but fears abandonment, heightened emotional responses
• Avoidant: Values independence, uncomfortable with too much closeness
• Exploratory: Seeks authentic expression and freedom, values personal growth

ANALYSIS FRAMEWORK:
1. **Emotional Regulation**: How does this persona handle stress, conflict, or intense emotions?
2. **Intimacy Comfort**: How do they approach emotional closeness and vulnerability?
3. **Relationship Patterns**: What patterns emerge in their relationship behaviors?
4. **Communication Style**: How do they express needs, boundaries, and emotions?
5. **Response to Partner Distress**: How do they react when others are upset or need support?

BEHAVIORAL OBSERVATIONS:
{examples}

OBSERVATION PERIOD: {period}

Please provide:
1. **Primary Attachment Style** with confidence level
2. **Supporting Evidence** from behavioral observations
3. **Secondary Patterns** if present (mixed attachment styles)
4. **Therapeutic Implications** for relationship development
5. **Recommendations** for supporting healthy attachment behaviors

Use specific examples and attachment theory principles in your analysis.",
        persona_id = args.persona_id,
        examples = or_default(
            &args.behavioral_examples,
            "Analyze recent interactions and relationship patterns"
        ),
        period = args.observation_period,
    )
}

fn analyze_emotional_climate(args: &EmotionalClimateArgs) -> String {
    let source = if args.interaction_id.is_empty() {
        "Conversation text provided".to_string()
    } else {
        format!("Interaction ID: {}", args.interaction_id)
    };
    let conversation = if args.conversation_text.is_empty() {
        String::new()
    } else {
        format!("Conversation Text: {}", args.conversation_text)
    };

    format!(
        "You are a relationship therapist analyzing emotional dynamics in interpersonal communication. Please evaluate the emotional climate and safety levels in this interaction.

CONTENT TO ANALYZE:
{source}
Participants: {participants}

{conversation}

EMOTIONAL CLIMATE ASSESSMENT FRAMEWORK:

1. **Safety Level** (1-10 scale):
   - Psychological safety for vulnerability
   - Respect for boundaries
   - Absence of criticism, contempt, defensiveness, stonewalling

2. **Emotional Attunement**:
   - Recognition of emotional needs
   - Empathic responses
   - Emotional validation vs. dismissal

3. **Communication Quality**:
   - Active listening indicators
   - \"I\" statements vs. \"you\" statements
   - Constructive vs. destructive patterns

4. **Power Dynamics**:
   - Balance vs. imbalance in speaking time
   - Respect for autonomy
   - Coercive or manipulative elements

5. **Attachment Activation**:
   - Signs of attachment system activation
   - Security-building vs. threat responses
   - Repair attempts during conflict

PROVIDE ANALYSIS INCLUDING:
- **Overall Safety Score** (1-10) with rationale
- **Key Emotional Patterns** observed
- **Attachment Dynamics** at play
- **Warning Signs** if present
- **Strengths** in the interaction
- **Recommendations** for improving emotional climate
- **Therapeutic Focus Areas** for future work

Use specific examples from the interaction to support your assessment.",
        participants = args.participants,
    )
}

fn generate_secure_response(args: &SecureResponseArgs) -> String {
    format!(
        "You are an attachment-informed therapist helping develop secure, emotionally attuned responses. Please generate responses that build attachment security and emotional safety.

SCENARIO: {scenario}

PARTICIPANTS: {personas}

INSECURITY TRIGGERS PRESENT: {triggers}

GROWTH GOALS: {goals}

SECURE RESPONSE FRAMEWORK:

1. **Emotional Safety First**:
   - Validate emotions without necessarily agreeing with behaviors
   - Create space for vulnerability
   - Avoid criticism, contempt, or defensiveness

2. **Attunement and Understanding**:
   - Reflect what you hear (emotional and content)
   - Ask curious, non-judgmental questions
   - Show genuine interest in their experience

3. **Secure Base Behaviors**:
   - Provide consistent, reliable responses
   - Balance support with encouragement of autonomy
   - Offer comfort without rescuing

4. **Repair and Growth**:
   - Take responsibility for your part in misunderstandings
   - Focus on connection over being \"right\"
   - Model healthy vulnerability and boundary-setting

GENERATE:
1. **Primary Response** that embodies secure attachment principles
2. **Alternative Responses** for different attachment styles of receiver
3. **Body Language/Tone** suggestions to accompany words
4. **What NOT to Say** - responses that would increase insecurity
5. **Follow-up Actions** to reinforce security over time
6. **Rationale** explaining how this builds attachment security

Focus on responses that help both parties feel seen, understood, and emotionally safe while maintaining healthy boundaries.",
        scenario = args.scenario_description,
        personas = args.personas,
        triggers = or_default(&args.insecurity_triggers, "Not specified"),
        goals = or_default(&args.growth_goals, "General attachment security"),
    )
}
