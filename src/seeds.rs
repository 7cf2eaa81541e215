//! Built-in mission content. Guarantees the trainer is playable with no
//! config file and no grading service: one full escape room, five study
//! modules, ten terminal locks.

use crate::domain::{
  ChoiceOption, ContentBlock, Difficulty, LearningModule, Mission, MissionSource, PatternCheck,
  Question, QuestionKind, Reference,
};

fn option(id: &str, text: &str, is_correct: bool, explanation: &str) -> ChoiceOption {
  ChoiceOption { id: id.into(), text: text.into(), is_correct, explanation: explanation.into() }
}

fn pattern(pattern: &str, error_message: &str) -> Option<PatternCheck> {
  Some(PatternCheck { pattern: pattern.into(), error_message: Some(error_message.into()) })
}

/// All built-in missions. Config-bank missions with the same id win; these
/// are the fallback content.
pub fn seed_missions() -> Vec<Mission> {
  vec![protocol_zero()]
}

/// The "Protocol Zero" escape room: the facility AI has sealed the lab and
/// every door is a cybersecurity lock.
fn protocol_zero() -> Mission {
  Mission {
    id: "protocol-zero".into(),
    title: "Protocol Zero".into(),
    description: "A rogue process has sealed the research lab. Work through ten security \
                  terminals, from logic gates to incident response, to regain control."
      .into(),
    difficulty: Difficulty::Intermediate,
    duration_minutes: 45,
    source: MissionSource::Seed,
    modules: protocol_zero_modules(),
    questions: protocol_zero_questions(),
  }
}

fn protocol_zero_modules() -> Vec<LearningModule> {
  vec![
    LearningModule {
      id: "logic-credentials".into(),
      title: "Logic Gates & Credentials".into(),
      summary: "How digital locks decide, and why passwords are the weakest gate.".into(),
      icon: "cpu".into(),
      content: vec![
        ContentBlock::Text {
          body: "Every digital lock reduces to logic gates. An AND gate outputs 1 only when \
                 every input is 1; an OR gate outputs 1 when at least one input is. Chained \
                 gates form the authorization circuits that decide whether a door opens."
            .into(),
        },
        ContentBlock::Code {
          body: "A=1, B=1  ->  AND(A,B) = 1\nA=1, B=0  ->  AND(A,B) = 0\nA=0, B=0  ->  OR(A,B)  = 0".into(),
        },
        ContentBlock::Tip {
          body: "Credential strength is about entropy, not cleverness: length and uniqueness \
                 beat symbol tricks. A 4-word passphrase outlasts 'P@ssw0rd!' by orders of \
                 magnitude."
            .into(),
        },
      ],
      references: vec![Reference {
        title: "NIST SP 800-63B: Digital Identity Guidelines".into(),
        url: "https://pages.nist.gov/800-63-3/sp800-63b.html".into(),
      }],
    },
    LearningModule {
      id: "social-engineering".into(),
      title: "Social Engineering".into(),
      summary: "Attacks on the human, not the machine.".into(),
      icon: "mail".into(),
      content: vec![
        ContentBlock::Text {
          body: "Phishing weaponizes urgency and authority: a message that looks official, \
                 demands immediate action, and routes you to a counterfeit page. The sender \
                 domain, not the display name, tells the truth."
            .into(),
        },
        ContentBlock::Code {
          body: "From: IT Support <security@yourbank-alerts.example>\nSubject: URGENT - confirm your password in 24h\nLink: http://yourbank.example.attacker.net/login".into(),
        },
        ContentBlock::Tip {
          body: "Tailgating is phishing in person: a uniform and a smile instead of a spoofed \
                 domain. Every unbadged entry goes through reception, no exceptions."
            .into(),
        },
      ],
      references: vec![Reference {
        title: "CISA: Avoiding Social Engineering and Phishing Attacks".into(),
        url: "https://www.cisa.gov/news-events/news/avoiding-social-engineering-and-phishing-attacks".into(),
      }],
    },
    LearningModule {
      id: "networks-encryption".into(),
      title: "Networks & Encryption".into(),
      summary: "Ports, TLS, and who may read what.".into(),
      icon: "lock".into(),
      content: vec![
        ContentBlock::Text {
          body: "Network services listen on well-known ports: 80 for plain HTTP, 443 for HTTP \
                 over TLS. The padlock in the browser means the transport is encrypted, not \
                 that the site is honest."
            .into(),
        },
        ContentBlock::Text {
          body: "Public-key cryptography splits the secret: the public key may travel openly \
                 and only encrypts or verifies; the private key stays with its owner and \
                 decrypts or signs. Sharing the private key breaks the whole scheme."
            .into(),
        },
      ],
      references: vec![Reference {
        title: "Cloudflare Learning: What is TLS?".into(),
        url: "https://www.cloudflare.com/learning/ssl/transport-layer-security-tls/".into(),
      }],
    },
    LearningModule {
      id: "identity-privacy".into(),
      title: "Identity & Privacy".into(),
      summary: "What counts as personal data and why it leaks.".into(),
      icon: "id-card".into(),
      content: vec![
        ContentBlock::Text {
          body: "Personally identifiable information (PII) is any data that singles out a \
                 person: passport numbers, home addresses, biometrics. Aggregated crumbs \
                 count too; three innocent fields can identify one individual."
            .into(),
        },
        ContentBlock::Tip {
          body: "Multi-factor authentication combines different factor types: something you \
                 know, something you have, something you are. Two passwords are still one \
                 factor."
            .into(),
        },
      ],
      references: vec![Reference {
        title: "GDPR Art. 4: Definitions (personal data)".into(),
        url: "https://gdpr-info.eu/art-4-gdpr/".into(),
      }],
    },
    LearningModule {
      id: "incident-response".into(),
      title: "Incident Response".into(),
      summary: "Malware classes and the first hour of an outbreak.".into(),
      icon: "siren".into(),
      content: vec![
        ContentBlock::Text {
          body: "Ransomware encrypts data and sells you the key; worms copy themselves across \
                 the network without anyone clicking anything. The response to both starts \
                 the same way: contain first, investigate second."
            .into(),
        },
        ContentBlock::Tip {
          body: "Containment means cutting the infected machines off the network while \
                 keeping evidence intact. Powering everything down destroys volatile traces \
                 the investigation needs."
            .into(),
        },
      ],
      references: vec![Reference {
        title: "NIST SP 800-61: Computer Security Incident Handling Guide".into(),
        url: "https://csrc.nist.gov/pubs/sp/800/61/r2/final".into(),
      }],
    },
  ]
}

fn protocol_zero_questions() -> Vec<Question> {
  vec![
    Question {
      id: "q1".into(),
      prompt: "The inner door uses a two-input gate that opens only when BOTH keycards are \
               present. Name the gate."
        .into(),
      context: Some("Terminal display: A=1, B=1 -> unlock; A=1, B=0 -> sealed.".into()),
      kind: QuestionKind::OpenEnded {
        validation: pattern(
          "(?i)^(E|AND)$",
          "The gate stays sealed. Think about what both inputs must be for it to open.",
        ),
        grading_criteria: None,
      },
    },
    Question {
      id: "q2".into(),
      prompt: "A mail from 'security@yourbank-alerts.example' demands you confirm your vault \
               password within 24 hours or lose access. What do you do?"
        .into(),
      context: None,
      kind: QuestionKind::MultipleChoice {
        options: vec![
          option(
            "a",
            "Follow the link quickly, before access is lost",
            false,
            "Urgency is the bait. The link leads to a counterfeit login page that harvests \
             your password.",
          ),
          option(
            "b",
            "Report the message as phishing through the official channel",
            true,
            "Right. The sender domain is not your bank's, and real institutions never demand \
             passwords by mail. Reporting protects everyone else too.",
          ),
          option(
            "c",
            "Reply asking whether the request is legitimate",
            false,
            "You would be asking the attacker. Verification must go through a channel you \
             already trust, never the suspicious message itself.",
          ),
          option(
            "d",
            "Forward it to colleagues so they can check it",
            false,
            "Forwarding spreads the trap. One curious colleague clicking the link is all an \
             attacker needs.",
          ),
        ],
      },
    },
    Question {
      id: "q3".into(),
      prompt: "The vault accepts a new credential policy. Describe, in your own words, what \
               makes a password strong and how the lab should manage its credentials."
        .into(),
      context: Some("Free-text answer. The warden AI grades your policy.".into()),
      kind: QuestionKind::OpenEnded {
        validation: None,
        grading_criteria: Some(
          "Mentions length (12+ characters or a multi-word passphrase), uniqueness per \
           service, avoiding personal data, and ideally a password manager and multi-factor \
           authentication."
            .into(),
        ),
      },
    },
    Question {
      id: "q4".into(),
      prompt: "Which combination is true multi-factor authentication?".into(),
      context: None,
      kind: QuestionKind::MultipleChoice {
        options: vec![
          option(
            "a",
            "Password plus a memorable security question",
            false,
            "Both are things you know: one factor used twice, not two factors.",
          ),
          option(
            "b",
            "Two different passwords entered in sequence",
            false,
            "Still a single factor type. An attacker who phishes one password phishes both.",
          ),
          option(
            "c",
            "Password plus a one-time code from an authenticator app",
            true,
            "Correct: something you know combined with something you have. Stealing the \
             password alone is no longer enough.",
          ),
          option(
            "d",
            "Username plus password",
            false,
            "The username is not a secret at all. This is single-factor authentication.",
          ),
        ],
      },
    },
    Question {
      id: "q5".into(),
      prompt: "The firewall opens one port for encrypted web traffic. Enter the default TCP \
               port for HTTPS."
        .into(),
      context: None,
      kind: QuestionKind::OpenEnded {
        validation: pattern("^443$", "The port stays closed. That is not the HTTPS default."),
        grading_criteria: None,
      },
    },
    Question {
      id: "q6".into(),
      prompt: "To receive encrypted reports from the field team, which key do you publish?".into(),
      context: Some("The lab uses standard public-key cryptography.".into()),
      kind: QuestionKind::MultipleChoice {
        options: vec![
          option(
            "a",
            "The private key",
            false,
            "Publishing the private key hands every future message, and your signature, to \
             anyone who finds it.",
          ),
          option(
            "b",
            "The public key",
            true,
            "Correct. The public key may travel openly; senders encrypt with it and only \
             your private key can decrypt.",
          ),
          option(
            "c",
            "Both keys, so the team can verify you",
            false,
            "Verification needs only the public key. The private one never leaves your \
             control.",
          ),
        ],
      },
    },
    Question {
      id: "q7".into(),
      prompt: "The warden describes the intruder: it encrypted the archive and left a payment \
               demand. Name this class of malware."
        .into(),
      context: None,
      kind: QuestionKind::OpenEnded {
        validation: pattern("(?i)RANSOMWARE", "The console blinks: wrong malware class."),
        grading_criteria: None,
      },
    },
    Question {
      id: "q8".into(),
      prompt: "The data-release gate asks which record must NOT leave the lab unprotected. \
               Which one is personally identifiable information?"
        .into(),
      context: None,
      kind: QuestionKind::MultipleChoice {
        options: vec![
          option(
            "a",
            "Tomorrow's weather forecast for the region",
            false,
            "Public, impersonal data. It identifies nobody.",
          ),
          option(
            "b",
            "The lab's published street address",
            false,
            "An organization's public address is not personal data about an individual.",
          ),
          option(
            "c",
            "A researcher's passport number",
            true,
            "Correct. A passport number singles out one person and enables identity theft; \
             it needs protection wherever it is stored.",
          ),
          option(
            "d",
            "The open-source build scripts",
            false,
            "Already public by intent, and about software, not people.",
          ),
        ],
      },
    },
    Question {
      id: "q9".into(),
      prompt: "At the server-room door, a stranger in a courier uniform asks you to hold it \
               open: 'just one delivery'. What is the secure move?"
        .into(),
      context: None,
      kind: QuestionKind::MultipleChoice {
        options: vec![
          option(
            "a",
            "Hold the door; refusing would be rude",
            false,
            "That is tailgating, the oldest physical intrusion there is. Courtesy is the \
             attack surface.",
          ),
          option(
            "b",
            "Direct them to reception to sign in and get an escort",
            true,
            "Correct. Every entry is authenticated at reception; a legitimate courier loses \
             two minutes, an intruder loses the attempt.",
          ),
          option(
            "c",
            "Let them in if they can name someone who works here",
            false,
            "Names of employees are on the website and on LinkedIn. Knowing one proves \
             nothing.",
          ),
        ],
      },
    },
    Question {
      id: "q10".into(),
      prompt: "Final terminal: a worm is spreading across lab workstations right now. What is \
               the FIRST action?"
        .into(),
      context: Some("Four workstations show the same unknown process. The file server is \
                     still clean."
        .into()),
      kind: QuestionKind::MultipleChoice {
        options: vec![
          option(
            "a",
            "Power off every machine in the building",
            false,
            "That stops the worm and also destroys the volatile evidence investigators need. \
             Containment, not annihilation.",
          ),
          option(
            "b",
            "Isolate the infected workstations from the network",
            true,
            "Correct. Cutting the network link stops propagation while preserving the \
             machines for analysis. Contain first, investigate second.",
          ),
          option(
            "c",
            "Mail all staff a warning and keep watching",
            false,
            "The worm does not wait for staff to read mail. By the time they do, the file \
             server is infected.",
          ),
          option(
            "d",
            "Run a full antivirus scan on the file server",
            false,
            "Scanning a clean server wastes the critical minutes in which the worm keeps \
             spreading from the workstations.",
          ),
        ],
      },
    },
  ]
}
