use proptest::prelude::*;
use proptest::sample::subsequence;

use provable_holdem::cards::Card;
use provable_holdem::evaluator::{evaluate, evaluate_five, Category};

fn distinct_cards(count: usize) -> impl Strategy<Value = Vec<Card>> {
    subsequence((0..52u8).collect::<Vec<u8>>(), count)
        .prop_map(|idx| idx.into_iter().map(|i| Card::from_index(i).unwrap()).collect())
}

proptest! {
    #[test]
    fn seven_card_result_is_the_best_five_card_subset(cards in distinct_cards(7)) {
        let best = evaluate(&cards).unwrap();
        // No 5-card subset may beat the reported best, and at least one must
        // reach it.
        let mut reached = false;
        for a in 0..3 {
            for b in a + 1..4 {
                for c in b + 1..5 {
                    for d in c + 1..6 {
                        for e in d + 1..7 {
                            let five =
                                [cards[a], cards[b], cards[c], cards[d], cards[e]];
                            let v = evaluate_five(&five).value;
                            prop_assert!(v <= best.value);
                            if v == best.value {
                                reached = true;
                            }
                        }
                    }
                }
            }
        }
        prop_assert!(reached);
    }

    #[test]
    fn evaluation_ignores_card_order(mut cards in distinct_cards(7)) {
        let forward = evaluate(&cards).unwrap();
        cards.reverse();
        let backward = evaluate(&cards).unwrap();
        prop_assert_eq!(forward.value, backward.value);
        prop_assert_eq!(forward.category, backward.category);
    }

    #[test]
    fn extra_cards_never_weaken_a_hand(cards in distinct_cards(7)) {
        let five = evaluate(&cards[..5]).unwrap();
        let six = evaluate(&cards[..6]).unwrap();
        let seven = evaluate(&cards).unwrap();
        prop_assert!(six.value >= five.value);
        prop_assert!(seven.value >= six.value);
    }

    #[test]
    fn value_orders_consistently_with_category(a in distinct_cards(5), b in distinct_cards(5)) {
        let ea = evaluate(&a).unwrap();
        let eb = evaluate(&b).unwrap();
        if ea.category > eb.category {
            prop_assert!(ea.value > eb.value);
        }
        if ea.value == eb.value {
            prop_assert_eq!(ea.category, eb.category);
        }
    }

    #[test]
    fn best_five_reproduces_the_reported_value(cards in distinct_cards(7)) {
        let eval = evaluate(&cards).unwrap();
        prop_assert_eq!(evaluate_five(&eval.best_five).value, eval.value);
        for c in eval.best_five {
            prop_assert!(cards.contains(&c), "best five must come from the input");
        }
    }

    #[test]
    fn five_distinct_cards_always_evaluate(cards in distinct_cards(5)) {
        let eval = evaluate(&cards).unwrap();
        prop_assert!(eval.category >= Category::HighCard);
        prop_assert!(eval.value > 0 || eval.category == Category::HighCard);
    }
}
