//! CLI tool for deploying and interacting with the Meridian lending contracts.

use meridian_contracts::currency_converter::CurrencyConverter;
use meridian_contracts::currency_registry::CurrencyRegistry;
use meridian_contracts::lending_engine::LendingEngine;
use meridian_contracts::price_feed::PriceFeed;
use meridian_contracts::yield_venue::SavingsVault;
use odra::casper_types::U256;
use odra::host::HostEnv;
use odra::prelude::{Address, Addressable};
use odra::schema::casper_contract_schema::NamedCLType;
use odra_cli::{
    deploy::DeployScript,
    scenario::{Args, Error, Scenario, ScenarioMetadata},
    CommandArg, ContractProvider, DeployedContractsContainer, DeployerExt, OdraCli,
};

/// Deploys the price feed contract.
pub struct PriceFeedDeployScript;

impl DeployScript for PriceFeedDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        use meridian_contracts::price_feed::PriceFeedInitArgs;

        let caller = env.caller();
        let _feed = PriceFeed::load_or_deploy(
            &env,
            PriceFeedInitArgs { admin: caller },
            container,
            300_000_000_000, // Gas limit for feed deployment
        )?;

        Ok(())
    }
}

/// Deploys the currency registry contract.
pub struct RegistryDeployScript;

impl DeployScript for RegistryDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        use meridian_contracts::currency_registry::CurrencyRegistryInitArgs;

        let caller = env.caller();
        let _registry = CurrencyRegistry::load_or_deploy(
            &env,
            CurrencyRegistryInitArgs { admin: caller },
            container,
            400_000_000_000,
        )?;

        Ok(())
    }
}

/// Deploys the full protocol (feed + registry + converter + vault + engine).
pub struct ProtocolDeployScript;

impl DeployScript for ProtocolDeployScript {
    fn deploy(
        &self,
        env: &HostEnv,
        container: &mut DeployedContractsContainer,
    ) -> Result<(), odra_cli::deploy::Error> {
        use meridian_contracts::currency_converter::CurrencyConverterInitArgs;
        use meridian_contracts::lending_engine::LendingEngineInitArgs;
        use meridian_contracts::yield_venue::SavingsVaultInitArgs;

        PriceFeedDeployScript.deploy(env, container)?;
        RegistryDeployScript.deploy(env, container)?;

        let registry = container.contract_ref::<CurrencyRegistry>(env)?;
        let registry_address = registry.address().clone();

        let converter = CurrencyConverter::load_or_deploy(
            &env,
            CurrencyConverterInitArgs {
                registry: registry_address.clone(),
            },
            container,
            300_000_000_000,
        )?;

        let caller = env.caller();
        let _vault = SavingsVault::load_or_deploy(
            &env,
            SavingsVaultInitArgs { admin: caller },
            container,
            400_000_000_000,
        )?;

        let _engine = LendingEngine::load_or_deploy(
            &env,
            LendingEngineInitArgs {
                registry: registry_address,
                converter: converter.address().clone(),
                admin: caller,
            },
            container,
            500_000_000_000, // Gas limit for engine deployment
        )?;

        Ok(())
    }
}

/// Scenario to register a currency with default risk parameters.
pub struct AddCurrencyScenario;

impl Scenario for AddCurrencyScenario {
    fn args(&self) -> Vec<CommandArg> {
        vec![
            CommandArg::new("currency", "Currency code, e.g. BOB", NamedCLType::String),
            CommandArg::new(
                "collateral_ratio",
                "Collateralization ratio, WAD (2e18 = 200%)",
                NamedCLType::U256,
            ),
            CommandArg::new(
                "liquidation_threshold",
                "Liquidation threshold, WAD (1.5e18 = 150%)",
                NamedCLType::U256,
            ),
        ]
    }

    fn run(
        &self,
        env: &HostEnv,
        container: &DeployedContractsContainer,
        args: Args,
    ) -> Result<(), Error> {
        let mut registry = container.contract_ref::<CurrencyRegistry>(env)?;
        let feed = container.contract_ref::<PriceFeed>(env)?;
        let feed_address: Address = feed.address().clone();

        let currency = args.get_single::<String>("currency")?;
        let collateral_ratio = args.get_single::<U256>("collateral_ratio")?;
        let liquidation_threshold = args.get_single::<U256>("liquidation_threshold")?;

        // 2% base, 1% min, 30% max, 10% sensitivity
        env.set_gas(300_000_000_000);
        registry.try_add_currency(
            currency,
            feed_address,
            collateral_ratio,
            liquidation_threshold,
            U256::from(20_000_000_000_000_000u128),
            U256::from(10_000_000_000_000_000u128),
            U256::from(300_000_000_000_000_000u128),
            U256::from(100_000_000_000_000_000u128),
        )?;

        println!("Currency registered successfully!");
        Ok(())
    }
}

impl ScenarioMetadata for AddCurrencyScenario {
    const NAME: &'static str = "add-currency";
    const DESCRIPTION: &'static str = "Registers a currency with default rate parameters";
}

/// Main function to run the CLI tool.
pub fn main() {
    OdraCli::new()
        .about("CLI tool for the Meridian lending contracts")
        // Deploy scripts
        .deploy(PriceFeedDeployScript)
        .deploy(RegistryDeployScript)
        .deploy(ProtocolDeployScript)
        // Contract references
        .contract::<PriceFeed>()
        .contract::<CurrencyRegistry>()
        .contract::<CurrencyConverter>()
        .contract::<SavingsVault>()
        .contract::<LendingEngine>()
        // Scenarios
        .scenario(AddCurrencyScenario)
        .build()
        .run();
}
