// src/seed.rs

use serde_json::json;

use crate::error::AppError;
use crate::store::{NewQuestion, NewQuiz, NewUser, QuizStore};
use crate::utils::hash::hash_password;

struct FixtureQuestion {
    text: &'static str,
    options: [&'static str; 4],
    correct: usize,
    explanation: &'static str,
}

struct FixtureQuiz {
    topic: &'static str,
    topic_description: &'static str,
    title: &'static str,
    description: &'static str,
    /// Store options as a serialized JSON string instead of an array, the
    /// shape the legacy importer wrote, so the decode path stays exercised
    /// against real rows.
    legacy_options: bool,
    questions: &'static [FixtureQuestion],
}

const FIXTURES: &[FixtureQuiz] = &[
    FixtureQuiz {
        topic: "JavaScript",
        topic_description: "Core JavaScript programming concepts",
        title: "JavaScript Fundamentals",
        description: "Test your knowledge of JavaScript basics",
        legacy_options: false,
        questions: &[
            FixtureQuestion {
                text: "What is hoisting in JavaScript?",
                options: [
                    "Moving declarations to the top of the scope",
                    "Removing unused variables",
                    "Optimizing the code execution",
                    "A way to organize imports",
                ],
                correct: 0,
                explanation: "Hoisting is JavaScript's default behavior of moving declarations to the top of the scope.",
            },
            FixtureQuestion {
                text: "Which keyword is used to declare a variable with block scope?",
                options: ["var", "let", "const", "scope"],
                correct: 1,
                explanation: "The `let` keyword declares a variable with block scope.",
            },
            FixtureQuestion {
                text: "What will `console.log(2 + '2')` output in JavaScript?",
                options: ["4", "22", "Error", "undefined"],
                correct: 1,
                explanation: "JavaScript performs string concatenation when a number is added to a string.",
            },
        ],
    },
    FixtureQuiz {
        topic: "JavaScript II",
        topic_description: "Advanced JavaScript programming concepts",
        title: "Advanced JavaScript Concepts",
        description: "Dig into the trickier corners of the language",
        legacy_options: true,
        questions: &[
            FixtureQuestion {
                text: "What is the purpose of the `typeof` operator?",
                options: [
                    "To check if a variable is defined",
                    "To determine the data type of a variable",
                    "To convert a variable to a specific type",
                    "To compare the values of two variables",
                ],
                correct: 1,
                explanation: "The `typeof` operator returns a string indicating the data type of the operand.",
            },
            FixtureQuestion {
                text: "Which of the following is NOT a primitive data type in JavaScript?",
                options: ["string", "number", "boolean", "object"],
                correct: 3,
                explanation: "`object` is a reference data type in JavaScript. The primitive types are string, number, boolean, null, undefined, symbol, and bigint.",
            },
            FixtureQuestion {
                text: "What does the `===` operator do in JavaScript?",
                options: [
                    "Assigns a value to a variable",
                    "Compares values for equality (with type coercion)",
                    "Compares values for equality (without type coercion)",
                    "Checks if a variable is strictly not equal to another",
                ],
                correct: 2,
                explanation: "The strict equality operator (`===`) compares both the value and the type of the operands.",
            },
        ],
    },
    FixtureQuiz {
        topic: "Marvel",
        topic_description: "Marvel Cinematic Universe knowledge",
        title: "Marvel Cinematic Universe",
        description: "How well do you know the MCU?",
        legacy_options: false,
        questions: &[
            FixtureQuestion {
                text: "What is the real name of Iron Man?",
                options: ["Bruce Banner", "Peter Parker", "Tony Stark", "Steve Rogers"],
                correct: 2,
                explanation: "The real name of Iron Man is Anthony 'Tony' Stark.",
            },
            FixtureQuestion {
                text: "What is the name of Thor's hammer?",
                options: ["Stormbreaker", "Vanir", "Mjolnir", "Norn Stone"],
                correct: 2,
                explanation: "The name of Thor's enchanted hammer is Mjolnir.",
            },
            FixtureQuestion {
                text: "Who is Peter Parker?",
                options: ["The Hulk", "Captain America", "Spider-Man", "Doctor Strange"],
                correct: 2,
                explanation: "Peter Parker is the civilian identity of Spider-Man.",
            },
            FixtureQuestion {
                text: "What is the name of the powerful artifact that Thanos seeks in the Infinity Saga?",
                options: [
                    "The Tesseract",
                    "The Eye of Agamotto",
                    "The Infinity Gauntlet",
                    "The Cosmic Cube",
                ],
                correct: 2,
                explanation: "Thanos seeks the Infinity Gauntlet, powered by the Infinity Stones.",
            },
            FixtureQuestion {
                text: "What is Captain America's shield made of?",
                options: ["Adamantium", "Vibranium", "Uru", "Promethium"],
                correct: 1,
                explanation: "Captain America's shield is made of Vibranium.",
            },
        ],
    },
    FixtureQuiz {
        topic: "Web Development",
        topic_description: "Web technologies and how they fit together",
        title: "Web Development Basics",
        description: "Core building blocks of the web",
        legacy_options: false,
        questions: &[
            FixtureQuestion {
                text: "Which of the following is NOT a core technology for web development?",
                options: ["HTML", "CSS", "JavaScript", "Python"],
                correct: 3,
                explanation: "HTML, CSS, and JavaScript are the core front-end technologies. Python is often used for back-end development.",
            },
            FixtureQuestion {
                text: "What does HTML stand for?",
                options: [
                    "Hyper Text Markup Language",
                    "Highly Technical Modern Language",
                    "Hyperlink and Text Management Language",
                    "Home Tool Markup Language",
                ],
                correct: 0,
                explanation: "HTML stands for Hyper Text Markup Language.",
            },
            FixtureQuestion {
                text: "What is CSS primarily used for?",
                options: [
                    "Adding interactivity to a webpage",
                    "Defining the structure of a webpage",
                    "Styling the presentation of a webpage",
                    "Managing server-side operations",
                ],
                correct: 2,
                explanation: "CSS (Cascading Style Sheets) is primarily used for styling the look and formatting of a webpage.",
            },
            FixtureQuestion {
                text: "Which HTML tag is used to create a hyperlink?",
                options: ["<link>", "<href>", "<a>", "<hyper>"],
                correct: 2,
                explanation: "The `<a>` tag (anchor tag) is used to create hyperlinks.",
            },
            FixtureQuestion {
                text: "What is the purpose of JavaScript in web development?",
                options: [
                    "To define the structure of content",
                    "To style the appearance of content",
                    "To add interactivity and dynamic behavior",
                    "To manage databases",
                ],
                correct: 2,
                explanation: "JavaScript is used to add interactivity, dynamic content, and client-side logic to web pages.",
            },
        ],
    },
    FixtureQuiz {
        topic: "Video Games",
        topic_description: "Video game knowledge and trivia",
        title: "Video Game Trivia",
        description: "From arcade classics to modern blockbusters",
        legacy_options: false,
        questions: &[
            FixtureQuestion {
                text: "What is the name of the main protagonist in the 'Legend of Zelda' series?",
                options: ["Zelda", "Link", "Ganondorf", "Impa"],
                correct: 1,
                explanation: "The main protagonist in the 'Legend of Zelda' series is typically Link.",
            },
            FixtureQuestion {
                text: "Which popular battle royale game features the 'Storm' that shrinks the play area?",
                options: [
                    "Apex Legends",
                    "Call of Duty: Warzone",
                    "Fortnite",
                    "PUBG: Battlegrounds",
                ],
                correct: 2,
                explanation: "Fortnite features a 'Storm' that gradually shrinks the safe playing area.",
            },
            FixtureQuestion {
                text: "What type of creature is Pac-Man famously known for eating?",
                options: ["Apples", "Bananas", "Power Pellets", "Cherries"],
                correct: 2,
                explanation: "Pac-Man eats Power Pellets to temporarily turn the ghosts vulnerable.",
            },
            FixtureQuestion {
                text: "In the 'Mass Effect' trilogy, what is the name of Commander Shepard's ship?",
                options: [
                    "The Normandy",
                    "The Enterprise",
                    "The Millennium Falcon",
                    "The Pillar of Autumn",
                ],
                correct: 0,
                explanation: "Commander Shepard's iconic starship is the SSV Normandy.",
            },
            FixtureQuestion {
                text: "Which company developed the 'Grand Theft Auto' series?",
                options: ["Nintendo", "Sony", "Rockstar Games", "Ubisoft"],
                correct: 2,
                explanation: "The 'Grand Theft Auto' series was primarily developed by Rockstar Games.",
            },
        ],
    },
];

/// Seeds starter topics, quizzes and a demo user on first boot.
///
/// Skipped entirely once any topic exists, so restarting does not duplicate
/// content. Correct answers are stored as resolved option text.
pub async fn seed_sample_content(store: &dyn QuizStore) -> Result<(), AppError> {
    if store.count_topics().await? > 0 {
        return Ok(());
    }

    tracing::info!("Seeding sample quiz content...");

    for fixture in FIXTURES {
        let topic = store
            .create_topic(fixture.topic, Some(fixture.topic_description))
            .await?;

        let quiz = store
            .create_quiz(NewQuiz {
                topic_id: topic.id,
                title: fixture.title.to_string(),
                description: Some(fixture.description.to_string()),
                difficulty: "MEDIUM".to_string(),
                is_published: true,
            })
            .await?;

        for (index, question) in fixture.questions.iter().enumerate() {
            let options = if fixture.legacy_options {
                let serialized = serde_json::to_string(&question.options)
                    .map_err(|e| AppError::InternalServerError(e.to_string()))?;
                json!(serialized)
            } else {
                json!(question.options)
            };

            store
                .create_question(NewQuestion {
                    quiz_id: quiz.id,
                    text: question.text.to_string(),
                    options,
                    correct_answer: question.options[question.correct].to_string(),
                    explanation: Some(question.explanation.to_string()),
                    points: 10,
                    order_index: index as i64,
                })
                .await?;
        }
    }

    if store.user_by_email("test@example.com").await?.is_none() {
        let password = hash_password("hashedpassword123")?;
        store
            .create_user(NewUser {
                email: "test@example.com".to_string(),
                name: Some("Test User".to_string()),
                password: Some(password),
                google_id: None,
            })
            .await?;
    }

    tracing::info!("Sample content seeded.");

    Ok(())
}
