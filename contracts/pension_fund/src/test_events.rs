extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    token, vec, Address, Env, IntoVal, Symbol, TryIntoVal,
};

use crate::events::{FundInitialized, InvestmentCreated, InvestmentWithdrawn};
use crate::test::{FreezableToken, FreezableTokenClient};
use crate::{Error, PensionFund, PensionFundClient};

const ONE: i128 = 1_000_000_000_000_000_000;
const MINIMUM: i128 = ONE / 10;

fn setup() -> (Env, PensionFundClient<'static>, token::StellarAssetClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    let token_admin = Address::generate(&env);
    let sac_contract = env.register_stellar_asset_contract_v2(token_admin);
    let sac = token::StellarAssetClient::new(&env, &sac_contract.address());
    let contract_id = env.register(PensionFund, ());
    let client = PensionFundClient::new(&env, &contract_id);
    (env, client, sac)
}

fn setup_with_init() -> (Env, PensionFundClient<'static>, token::StellarAssetClient<'static>) {
    let (env, client, sac) = setup();
    client.init(&Address::generate(&env), &sac.address, &MINIMUM);
    (env, client, sac)
}

#[test]
fn test_fund_initialized_event() {
    let (env, client, sac) = setup();
    let owner = Address::generate(&env);

    client.init(&owner, &sac.address, &MINIMUM);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![&env, symbol_short!("init").into_val(&env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: FundInitialized = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FundInitialized {
            owner,
            token: sac.address.clone(),
            minimum_investment: MINIMUM,
        }
    );
}

#[test]
fn test_investment_created_event() {
    let (env, client, sac) = setup_with_init();
    let participant = Address::generate(&env);
    sac.mint(&participant, &ONE);

    client.invest(&participant, &60, &ONE);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: (symbol_short!("invested"), participant)
    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("invested").into_val(&env),
        participant.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: InvestmentCreated = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        InvestmentCreated {
            participant: participant.clone(),
            amount: ONE,
            stablecoin_percentage: 60,
        }
    );
}

/// Top-ups emit the same event, carrying only the amount of that call.
#[test]
fn test_top_up_emits_investment_created() {
    let (env, client, sac) = setup_with_init();
    let participant = Address::generate(&env);
    sac.mint(&participant, &(2 * ONE));

    client.invest(&participant, &60, &ONE);
    client.invest(&participant, &10, &(ONE / 2));

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let event_data: InvestmentCreated = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        InvestmentCreated {
            participant: participant.clone(),
            amount: ONE / 2,
            stablecoin_percentage: 10,
        }
    );
}

#[test]
fn test_investment_withdrawn_event() {
    let (env, client, sac) = setup_with_init();
    let participant = Address::generate(&env);
    sac.mint(&participant, &ONE);
    client.invest(&participant, &60, &ONE);

    client.withdraw(&participant, &(ONE / 2));

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("withdrawn").into_val(&env),
        participant.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: InvestmentWithdrawn = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        InvestmentWithdrawn {
            participant: participant.clone(),
            amount: ONE / 2,
            stablecoin_share: 300_000_000_000_000_000,
            growing_assets_share: 200_000_000_000_000_000,
        }
    );
}

/// Fund events whose leading topic is `topic`.
fn fund_events_with_topic(env: &Env, client: &PensionFundClient, topic: Symbol) -> usize {
    env.events()
        .all()
        .iter()
        .filter(|e| e.0 == client.address)
        .filter(|e| {
            e.1.first()
                .and_then(|t| TryIntoVal::<Env, Symbol>::try_into_val(&t, env).ok())
                .is_some_and(|t| t == topic)
        })
        .count()
}

#[test]
fn test_rejected_invest_emits_nothing_from_fund() {
    let (env, client, sac) = setup_with_init();
    let participant = Address::generate(&env);
    sac.mint(&participant, &ONE);

    let _ = client.try_invest(&participant, &101, &ONE);

    assert_eq!(fund_events_with_topic(&env, &client, symbol_short!("invested")), 0);
}

#[test]
fn test_invest_with_failed_transfer_emits_nothing_from_fund() {
    let (env, client, _sac) = setup_with_init();
    let unfunded = Address::generate(&env);

    let result = client.try_invest(&unfunded, &60, &ONE);

    assert_eq!(result, Err(Ok(Error::TransferFailed)));
    assert_eq!(fund_events_with_topic(&env, &client, symbol_short!("invested")), 0);
}

#[test]
fn test_rejected_withdraw_emits_nothing_from_fund() {
    let (env, client, sac) = setup_with_init();
    let participant = Address::generate(&env);
    sac.mint(&participant, &ONE);
    client.invest(&participant, &60, &ONE);
    let stranger = Address::generate(&env);

    assert_eq!(
        client.try_withdraw(&stranger, &1),
        Err(Ok(Error::NoInvestmentFound))
    );
    assert_eq!(fund_events_with_topic(&env, &client, symbol_short!("withdrawn")), 0);

    assert_eq!(
        client.try_withdraw(&participant, &(ONE + 1)),
        Err(Ok(Error::InsufficientFunds))
    );
    assert_eq!(fund_events_with_topic(&env, &client, symbol_short!("withdrawn")), 0);
}

#[test]
fn test_withdraw_with_failed_payout_emits_nothing_from_fund() {
    let env = Env::default();
    env.mock_all_auths();
    let token_id = env.register(FreezableToken, ());
    let token = FreezableTokenClient::new(&env, &token_id);
    let client = PensionFundClient::new(&env, &env.register(PensionFund, ()));
    client.init(&Address::generate(&env), &token_id, &MINIMUM);

    let participant = Address::generate(&env);
    token.mint(&participant, &ONE);
    client.invest(&participant, &60, &ONE);

    token.freeze();
    assert_eq!(
        client.try_withdraw(&participant, &(ONE / 2)),
        Err(Ok(Error::TransferFailed))
    );
    assert_eq!(fund_events_with_topic(&env, &client, symbol_short!("withdrawn")), 0);
}
