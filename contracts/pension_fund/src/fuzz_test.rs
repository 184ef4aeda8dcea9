extern crate std;

use proptest::prelude::*;
use soroban_sdk::{testutils::Address as _, token, Address, Env};
use std::vec::Vec;

use crate::invariants::{assert_all_fund_invariants, assert_unchanged, snapshot};
use crate::{Error, PensionFund, PensionFundClient};

const MINIMUM: i128 = 1_000;
const PARTICIPANTS: usize = 3;

#[derive(Clone, Debug)]
enum Op {
    Invest { who: usize, pct: u32, amount: i128 },
    Withdraw { who: usize, amount: i128 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..PARTICIPANTS, 0u32..=110, 0i128..50_000).prop_map(|(who, pct, amount)| Op::Invest {
            who,
            pct,
            amount
        }),
        (0..PARTICIPANTS, 0i128..60_000).prop_map(|(who, amount)| Op::Withdraw { who, amount }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn fund_invariants_hold_for_any_sequence(ops in proptest::collection::vec(op_strategy(), 1..24)) {
        let env = Env::default();
        env.mock_all_auths();
        let sac_contract = env.register_stellar_asset_contract_v2(Address::generate(&env));
        let sac = token::StellarAssetClient::new(&env, &sac_contract.address());
        let client = PensionFundClient::new(&env, &env.register(PensionFund, ()));
        client.init(&Address::generate(&env), &sac.address, &MINIMUM);

        let participants: Vec<Address> = (0..PARTICIPANTS)
            .map(|_| {
                let p = Address::generate(&env);
                sac.mint(&p, &10_000_000);
                p
            })
            .collect();

        for op in ops {
            let before = snapshot(&client, &participants);
            let result = match &op {
                Op::Invest { who, pct, amount } => {
                    client.try_invest(&participants[*who], pct, amount)
                }
                Op::Withdraw { who, amount } => client.try_withdraw(&participants[*who], amount),
            };

            match result {
                Ok(_) => {}
                Err(Ok(
                    Error::InvestmentTooLow
                    | Error::InvalidPercentage
                    | Error::NoInvestmentFound
                    | Error::InsufficientFunds
                    | Error::InsufficientLiquidity,
                )) => assert_unchanged(&before, &snapshot(&client, &participants)),
                other => prop_assert!(false, "unexpected outcome {:?} for {:?}", other, op),
            }

            assert_all_fund_invariants(&client, &participants);
        }
    }
}
