use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("a question needs exactly {OPTION_COUNT} options, got {0}")]
    WrongOptionCount(usize),

    #[error("correct option index {0} is out of range")]
    CorrectOutOfRange(usize),

    #[error("a question bank needs at least one question")]
    EmptyBank,

    #[error("quiz id cannot be empty")]
    EmptyQuizId,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// One multiple-choice question with its answer rewards.
///
/// Immutable for the process lifetime: banks are defined at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct: usize,
    fact: String,
    tip: String,
}

impl Question {
    /// Create a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the prompt is empty, the option count
    /// is not [`OPTION_COUNT`], or the correct index is out of range.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct: usize,
        fact: impl Into<String>,
        tip: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        if options.len() != OPTION_COUNT {
            return Err(QuestionError::WrongOptionCount(options.len()));
        }
        if correct >= options.len() {
            return Err(QuestionError::CorrectOutOfRange(correct));
        }

        Ok(Self {
            prompt,
            options,
            correct,
            fact: fact.into(),
            tip: tip.into(),
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// 0-based index of the correct option.
    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn fact(&self) -> &str {
        &self.fact
    }

    #[must_use]
    pub fn tip(&self) -> &str {
        &self.tip
    }

    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct
    }
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

/// A named, non-empty, ordered set of questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    quiz_id: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Create a bank from an id slug and its questions.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyQuizId` or `QuestionError::EmptyBank`.
    pub fn new(
        quiz_id: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, QuestionError> {
        let quiz_id = quiz_id.into();
        if quiz_id.trim().is_empty() {
            return Err(QuestionError::EmptyQuizId);
        }
        if questions.is_empty() {
            return Err(QuestionError::EmptyBank);
        }
        Ok(Self { quiz_id, questions })
    }

    /// Identifier used to key the persisted documents for this quiz.
    #[must_use]
    pub fn quiz_id(&self) -> &str {
        &self.quiz_id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The built-in eco-challenge bank: 12 questions, id `eco-quiz-challenge`.
    ///
    /// # Panics
    ///
    /// Panics only if the built-in data were invalid, which the tests pin.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn eco_challenge() -> Self {
        fn q(
            prompt: &str,
            options: [&str; OPTION_COUNT],
            correct: usize,
            fact: &str,
            tip: &str,
        ) -> Question {
            Question::new(
                prompt,
                options.iter().map(ToString::to_string).collect(),
                correct,
                fact,
                tip,
            )
            .expect("built-in question is valid")
        }

        let questions = vec![
            q(
                "Which action best reduces carbon emissions?",
                [
                    "Using LED bulbs",
                    "Driving short trips alone",
                    "Burning leaves",
                    "Keeping AC at 16°C",
                ],
                0,
                "LED bulbs use up to 80% less energy than traditional bulbs.",
                "Combine errands or carpool to cut emissions.",
            ),
            q(
                "What is the most eco-friendly way to dispose of kitchen scraps?",
                [
                    "Throw in landfill",
                    "Compost them",
                    "Burn them",
                    "Flush down sink",
                ],
                1,
                "Composting can reduce household waste by up to 30%.",
                "Start a small compost bin for fruit peels and veggies.",
            ),
            q(
                "Which material is endlessly recyclable?",
                ["Glass", "Tissue paper", "Styrofoam", "Plastic bags"],
                0,
                "Glass can be recycled without losing quality.",
                "Rinse and separate glass before recycling.",
            ),
            q(
                "What helps conserve water at home?",
                [
                    "Fixing leaky taps",
                    "Long showers",
                    "Over-watering plants",
                    "Running half loads",
                ],
                0,
                "A dripping tap can waste thousands of liters a year.",
                "Check faucets monthly for leaks.",
            ),
            q(
                "Which energy source is renewable?",
                ["Coal", "Natural gas", "Solar", "Diesel"],
                2,
                "Solar power produces zero direct emissions.",
                "Use solar chargers for small gadgets.",
            ),
            q(
                "What is the best choice for reusable shopping?",
                [
                    "Cloth tote",
                    "Single-use plastic",
                    "Foil bag",
                    "Paper every time",
                ],
                0,
                "Reusable bags can offset hundreds of single-use bags per year.",
                "Keep a foldable tote in your backpack.",
            ),
            q(
                "Why are pollinators important?",
                [
                    "They clean water",
                    "They help plants reproduce",
                    "They reduce noise",
                    "They prevent fires",
                ],
                1,
                "About 75% of food crops depend on pollinators.",
                "Plant native flowers to attract bees and butterflies.",
            ),
            q(
                "Which practice improves soil health?",
                [
                    "Overusing pesticides",
                    "Crop rotation",
                    "Leaving soil bare",
                    "Burning stubble",
                ],
                1,
                "Crop rotation boosts soil nutrients naturally.",
                "Mix legumes with vegetables in your garden plan.",
            ),
            q(
                "What is the cleanest transportation option for short trips?",
                ["Cycling or walking", "Motorbike", "Taxi", "Private car"],
                0,
                "Walking produces zero emissions and improves health.",
                "Try a bike ride for trips under 2 km.",
            ),
            q(
                "Which action supports wildlife conservation?",
                [
                    "Buying illegal wildlife products",
                    "Supporting protected areas",
                    "Littering in parks",
                    "Feeding wild animals",
                ],
                1,
                "Protected areas help preserve habitats and biodiversity.",
                "Follow park rules to keep wildlife safe.",
            ),
            q(
                "How can you reduce food waste?",
                [
                    "Plan meals",
                    "Overbuy groceries",
                    "Ignore leftovers",
                    "Throw away extras",
                ],
                0,
                "About one-third of food produced is wasted globally.",
                "Store leftovers in clear containers to remember them.",
            ),
            q(
                "Which item belongs in the e-waste bin?",
                ["Old phone", "Banana peel", "Paper towel", "Glass jar"],
                0,
                "E-waste contains valuable metals that can be recovered.",
                "Locate a certified e-waste drop-off center nearby.",
            ),
        ];

        Self::new("eco-quiz-challenge", questions).expect("built-in bank is valid")
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("option {i}")).collect()
    }

    #[test]
    fn rejects_empty_prompt() {
        let err = Question::new("  ", options(4), 0, "f", "t").unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn rejects_wrong_option_count() {
        let err = Question::new("Q", options(3), 0, "f", "t").unwrap_err();
        assert_eq!(err, QuestionError::WrongOptionCount(3));
    }

    #[test]
    fn rejects_out_of_range_correct_index() {
        let err = Question::new("Q", options(4), 4, "f", "t").unwrap_err();
        assert_eq!(err, QuestionError::CorrectOutOfRange(4));
    }

    #[test]
    fn bank_requires_id_and_questions() {
        let question = Question::new("Q", options(4), 0, "f", "t").unwrap();
        assert_eq!(
            QuestionBank::new(" ", vec![question]).unwrap_err(),
            QuestionError::EmptyQuizId
        );
        assert_eq!(
            QuestionBank::new("quiz", Vec::new()).unwrap_err(),
            QuestionError::EmptyBank
        );
    }

    #[test]
    fn builtin_bank_is_valid() {
        let bank = QuestionBank::eco_challenge();
        assert_eq!(bank.quiz_id(), "eco-quiz-challenge");
        assert_eq!(bank.len(), 12);
        for question in bank.questions() {
            assert_eq!(question.options().len(), OPTION_COUNT);
            assert!(question.correct() < OPTION_COUNT);
            assert!(!question.fact().is_empty());
            assert!(!question.tip().is_empty());
        }
    }

    #[test]
    fn builtin_bank_first_question_matches_source_data() {
        let bank = QuestionBank::eco_challenge();
        let first = bank.question(0).unwrap();
        assert!(first.is_correct(0));
        assert_eq!(first.options()[0], "Using LED bulbs");
    }
}
