//! Prompt builders for the assist features.

use std::fmt::Write as _;

use crate::domain::{Poll, Tally};

/// Number of options requested from the generator.
pub const SUGGESTED_OPTION_COUNT: usize = 4;

/// Prompt asking for poll options on `topic`.
pub fn options_prompt(topic: &str) -> String {
    format!(
        "Generate {SUGGESTED_OPTION_COUNT} creative and diverse options for a poll on the topic: \
         \"{topic}\"\n\
         Format the response as a JSON array of strings.\n\
         Example: [\"Option 1\", \"Option 2\", \"Option 3\", \"Option 4\"]\n",
        topic = topic.trim()
    )
}

/// Prompt asking for a structured summary of `poll`'s results.
pub fn analysis_prompt(poll: &Poll, tally: &Tally) -> String {
    let mut prompt = format!(
        "Analyze the results of a poll on the topic: \"{}\"\nOptions and votes:\n",
        poll.topic()
    );
    for (index, option) in poll.options().iter().enumerate() {
        let _ = writeln!(
            prompt,
            "{option}: {} votes ({:.1}%)",
            tally.count(index),
            tally.percentage(index)
        );
    }
    let _ = writeln!(prompt, "Total votes: {}", tally.total());
    let leaders: Vec<&str> = tally
        .leaders()
        .into_iter()
        .filter_map(|index| poll.options().get(index).map(String::as_str))
        .collect();
    match leaders.as_slice() {
        [] => prompt.push_str("Leading: none (no votes yet)\n"),
        [single] => {
            let _ = writeln!(prompt, "Leading: {single}");
        }
        tied => {
            let _ = writeln!(prompt, "Leading: tie between {}", tied.join(", "));
        }
    }
    prompt.push_str(
        "\nProvide a brief analysis of the results, including:\n\
         1. The winning option and its significance\n\
         2. Any surprising outcomes or close races\n\
         3. Possible reasons for the voting distribution\n\
         4. Suggestions for a follow-up poll or action based on these results\n\n\
         Format the response as a JSON object with the following structure:\n\
         {\n  \"winner\": \"Winning option\",\n  \"analysis\": \"Brief analysis of the results\",\n  \
         \"followUp\": \"Suggestion for a follow-up poll or action\"\n}\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ExternalIdentity, PollDraft, PollId, UserId, Vote, VotingWindow,
    };
    use chrono::Utc;
    use rstest::rstest;

    #[test]
    fn options_prompt_names_topic_and_format() {
        let prompt = options_prompt("  Weekend plans ");
        assert!(prompt.contains("\"Weekend plans\""));
        assert!(prompt.contains("JSON array"));
        assert!(prompt.contains("4 creative"));
    }

    #[test]
    fn analysis_prompt_lists_each_option_with_counts() {
        let now = Utc::now();
        let poll = Poll::new(PollDraft {
            id: PollId::random(),
            topic: "Tabs or spaces".into(),
            options: vec!["Tabs".into(), "Spaces".into()],
            is_public: true,
            window: VotingWindow::new(now, now),
            created_by: UserId::random(),
            created_at: now,
        })
        .expect("valid poll");
        let voter = ExternalIdentity::new("user_1").expect("identity");
        let votes = vec![
            Vote::cast(poll.id(), voter.clone(), 1, now),
            Vote::cast(poll.id(), voter, 1, now),
        ];
        let tally = Tally::from_votes(2, &votes);

        let prompt = analysis_prompt(&poll, &tally);

        assert!(prompt.contains("\"Tabs or spaces\""));
        assert!(prompt.contains("Tabs: 0 votes (0.0%)"));
        assert!(prompt.contains("Spaces: 2 votes (100.0%)"));
        assert!(prompt.contains("Leading: Spaces\n"));
        assert!(prompt.contains("\"followUp\""));
    }

    #[rstest]
    #[case::tie(&[0, 1], "Leading: tie between Tabs, Spaces\n")]
    #[case::no_votes(&[], "Leading: none (no votes yet)\n")]
    fn analysis_prompt_names_the_leaders(#[case] indices: &[u32], #[case] expected: &str) {
        let now = Utc::now();
        let poll = Poll::new(PollDraft {
            id: PollId::random(),
            topic: "Tabs or spaces".into(),
            options: vec!["Tabs".into(), "Spaces".into()],
            is_public: true,
            window: VotingWindow::new(now, now),
            created_by: UserId::random(),
            created_at: now,
        })
        .expect("valid poll");
        let voter = ExternalIdentity::new("user_1").expect("identity");
        let votes: Vec<Vote> = indices
            .iter()
            .map(|index| Vote::cast(poll.id(), voter.clone(), *index, now))
            .collect();

        let prompt = analysis_prompt(&poll, &Tally::from_votes(2, &votes));

        assert!(prompt.contains(expected));
    }
}
