//! Assembly of deployment and mint calls.
//!
//! Everything here is pure: inputs are validated and turned into ordered call
//! arguments before any request reaches the wallet.

use alloy_core::primitives::{Address, Bytes, U256};
use alloy_sol_types::{SolCall, SolConstructor};
use serde::{Deserialize, Serialize};

use crate::{
    ChainId, ContractArtifacts, ContractStandard, DeploymentMode, FactoryRegistry,
    LaunchpadError, TxRequest,
    contracts::{CollectionFactory, ERC721Launchpad, ERC1155Launchpad},
};

/// Upper bound on the quantity of a single ERC-721 mint request.
pub const MAX_MINT_QUANTITY: u32 = 20;

/// Collection parameters as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentParams {
    pub name: String,
    /// ERC-721 only.
    pub symbol: String,
    /// Usually the gateway URL returned by the pinning upload.
    pub asset_uri: String,
    /// Decimal string, ERC-721 only.
    pub max_supply: String,
}

/// Validated arguments shared by the factory call and the ERC-721 constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionArgs {
    pub name: String,
    pub symbol: String,
    pub base_token_uri: String,
    pub max_supply: U256,
}

/// Constructor arguments for a direct deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArgs {
    Erc721(CollectionArgs),
    Erc1155 { uri: String },
}

/// Which function or constructor to invoke, with its ordered arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallPlan {
    /// `deployCollection(name, symbol, baseTokenURI, maxSupply)` on a factory.
    Factory {
        factory: Address,
        args: CollectionArgs,
    },
    /// Contract creation with constructor arguments.
    Direct(ConstructorArgs),
}

/// Assemble a call plan against the built-in factory table.
pub fn assemble(
    chain_id: Option<ChainId>,
    mode: DeploymentMode,
    standard: ContractStandard,
    params: &DeploymentParams,
) -> Result<CallPlan, LaunchpadError> {
    FactoryRegistry::default().assemble(chain_id, mode, standard, params)
}

impl DeploymentParams {
    /// Check the fields `standard` needs and parse them into constructor arguments.
    ///
    /// Fields that do not apply to the standard are ignored.
    pub fn validate(&self, standard: ContractStandard) -> Result<ConstructorArgs, LaunchpadError> {
        let name = required("name", &self.name)?;
        let asset_uri = required("asset URI", &self.asset_uri)?;

        match standard {
            ContractStandard::Erc721 => Ok(ConstructorArgs::Erc721(CollectionArgs {
                name,
                symbol: required("symbol", &self.symbol)?,
                base_token_uri: asset_uri,
                max_supply: parse_decimal("max supply", &self.max_supply)?,
            })),
            ContractStandard::Erc1155 => Ok(ConstructorArgs::Erc1155 { uri: asset_uri }),
        }
    }
}

impl FactoryRegistry {
    /// Validate `params` for `standard` and build the call plan for `mode`.
    pub fn assemble(
        &self,
        chain_id: Option<ChainId>,
        mode: DeploymentMode,
        standard: ContractStandard,
        params: &DeploymentParams,
    ) -> Result<CallPlan, LaunchpadError> {
        let chain_id = chain_id
            .ok_or_else(|| LaunchpadError::validation("no active network, connect a wallet"))?;

        match (mode, params.validate(standard)?) {
            (DeploymentMode::Direct, ctor) => Ok(CallPlan::Direct(ctor)),
            (DeploymentMode::Factory, ConstructorArgs::Erc721(args)) => {
                let factory = self.lookup(chain_id).ok_or_else(|| {
                    LaunchpadError::validation(format!(
                        "no factory registered for chain {}",
                        chain_id
                    ))
                })?;
                Ok(CallPlan::Factory { factory, args })
            }
            (DeploymentMode::Factory, ConstructorArgs::Erc1155 { .. }) => Err(
                LaunchpadError::validation("factories only deploy ERC721 collections"),
            ),
        }
    }
}

impl CallPlan {
    pub fn mode(&self) -> DeploymentMode {
        match self {
            Self::Factory { .. } => DeploymentMode::Factory,
            Self::Direct(_) => DeploymentMode::Direct,
        }
    }

    pub fn standard(&self) -> ContractStandard {
        match self {
            Self::Factory { .. } | Self::Direct(ConstructorArgs::Erc721(_)) => {
                ContractStandard::Erc721
            }
            Self::Direct(ConstructorArgs::Erc1155 { .. }) => ContractStandard::Erc1155,
        }
    }

    /// Name of the invoked function, `constructor` for direct deployments.
    pub fn function(&self) -> &'static str {
        match self {
            Self::Factory { .. } => "deployCollection",
            Self::Direct(_) => "constructor",
        }
    }

    /// Encode the plan as a transaction sent from `from`.
    pub fn transaction(
        &self,
        from: Address,
        artifacts: &ContractArtifacts,
    ) -> Result<TxRequest, LaunchpadError> {
        match self {
            Self::Factory { factory, args } => {
                let call = CollectionFactory::deployCollectionCall {
                    name: args.name.clone(),
                    symbol: args.symbol.clone(),
                    baseTokenURI: args.base_token_uri.clone(),
                    maxSupply: args.max_supply,
                };
                Ok(TxRequest::call(from, *factory, call.abi_encode().into()))
            }
            Self::Direct(ctor) => {
                let bytecode = artifacts.bytecode(self.standard())?;
                let encoded_args = match ctor {
                    ConstructorArgs::Erc721(args) => ERC721Launchpad::constructorCall {
                        name: args.name.clone(),
                        symbol: args.symbol.clone(),
                        baseTokenURI: args.base_token_uri.clone(),
                        maxSupply: args.max_supply,
                    }
                    .abi_encode(),
                    ConstructorArgs::Erc1155 { uri } => {
                        ERC1155Launchpad::constructorCall { uri: uri.clone() }.abi_encode()
                    }
                };

                let mut data = bytecode.to_vec();
                data.extend_from_slice(&encoded_args);
                Ok(TxRequest::create(from, data.into()))
            }
        }
    }
}

/// A mint against a deployed collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MintRequest {
    /// Mint `quantity` new tokens to the connected account.
    Erc721 { quantity: u32 },
    /// Mint `amount` units of `token_id` to the connected account.
    Erc1155 { token_id: U256, amount: U256 },
}

impl MintRequest {
    pub fn erc721(quantity: &str) -> Result<Self, LaunchpadError> {
        let quantity: u32 = quantity.trim().parse().map_err(|_| {
            LaunchpadError::validation(format!("quantity '{}' is not a number", quantity))
        })?;

        if !(1..=MAX_MINT_QUANTITY).contains(&quantity) {
            return Err(LaunchpadError::validation(format!(
                "quantity must be between 1 and {}",
                MAX_MINT_QUANTITY
            )));
        }

        Ok(Self::Erc721 { quantity })
    }

    pub fn erc1155(token_id: &str, amount: &str) -> Result<Self, LaunchpadError> {
        let token_id = parse_decimal("token id", token_id)?;
        let amount = parse_decimal("amount", amount)?;

        if amount.is_zero() {
            return Err(LaunchpadError::validation("amount must be at least 1"));
        }

        Ok(Self::Erc1155 { token_id, amount })
    }

    pub fn standard(&self) -> ContractStandard {
        match self {
            Self::Erc721 { .. } => ContractStandard::Erc721,
            Self::Erc1155 { .. } => ContractStandard::Erc1155,
        }
    }
}

/// How an ERC-721 request for several tokens is turned into transactions.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MintStrategy {
    /// One `mint(1)` transaction per token, each confirmed before the next.
    /// Not atomic: a failure leaves earlier tokens minted.
    #[default]
    Sequential,
    /// A single ERC-721A `mint(quantity)` transaction.
    Native,
}

/// Build the ordered mint transactions for `request`.
///
/// `unit_price` is the value attached per ERC-721 token.
pub fn plan_mint(
    collection: Address,
    recipient: Address,
    request: &MintRequest,
    strategy: MintStrategy,
    unit_price: U256,
) -> Vec<TxRequest> {
    match (request, strategy) {
        (MintRequest::Erc721 { quantity }, MintStrategy::Sequential) => {
            let data: Bytes = ERC721Launchpad::mintCall {
                quantity: U256::from(1),
            }
            .abi_encode()
            .into();

            (0..*quantity)
                .map(|_| {
                    TxRequest::call(recipient, collection, data.clone()).with_value(unit_price)
                })
                .collect()
        }
        (MintRequest::Erc721 { quantity }, MintStrategy::Native) => {
            let data = ERC721Launchpad::mintCall {
                quantity: U256::from(*quantity),
            }
            .abi_encode();
            let value = unit_price.saturating_mul(U256::from(*quantity));

            vec![TxRequest::call(recipient, collection, data.into()).with_value(value)]
        }
        (MintRequest::Erc1155 { token_id, amount }, _) => {
            let data = ERC1155Launchpad::mintCall {
                account: recipient,
                id: *token_id,
                amount: *amount,
                data: Bytes::new(),
            }
            .abi_encode();

            vec![TxRequest::call(recipient, collection, data.into())]
        }
    }
}

fn required(field: &str, value: &str) -> Result<String, LaunchpadError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LaunchpadError::validation(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

fn parse_decimal(field: &str, value: &str) -> Result<U256, LaunchpadError> {
    let value = required(field, value)?;
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(LaunchpadError::validation(format!(
            "{} '{}' is not a number",
            field, value
        )));
    }
    U256::from_str_radix(&value, 10)
        .map_err(|e| LaunchpadError::validation(format!("{} '{}': {}", field, value, e)))
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::address;
    use alloy_sol_types::SolCall;

    use super::*;
    use crate::select_mode;

    const ME: Address = address!("70997970C51812dc3A010C7d01b50e0d17dc79C8");
    const COLLECTION: Address = address!("5FbDB2315678afecb367f032d93F642f64180aa3");

    fn chain(id: u64) -> Option<ChainId> {
        Some(ChainId::new(id).unwrap())
    }

    fn erc721_params() -> DeploymentParams {
        DeploymentParams {
            name: "Bored Apes".to_string(),
            symbol: "BAYC".to_string(),
            asset_uri: "https://gw/ipfs/abc".to_string(),
            max_supply: "10000".to_string(),
        }
    }

    #[test]
    fn test_factory_erc721_on_sepolia() {
        let mode = select_mode(ChainId::new(11155111).unwrap(), ContractStandard::Erc721);
        assert_eq!(mode, DeploymentMode::Factory);

        let plan = assemble(chain(11155111), mode, ContractStandard::Erc721, &erc721_params())
            .unwrap();

        assert_eq!(plan.function(), "deployCollection");
        assert_eq!(
            plan,
            CallPlan::Factory {
                factory: address!("1234567890123456789012345678901234567890"),
                args: CollectionArgs {
                    name: "Bored Apes".to_string(),
                    symbol: "BAYC".to_string(),
                    base_token_uri: "https://gw/ipfs/abc".to_string(),
                    max_supply: U256::from(10000),
                },
            }
        );
    }

    #[test]
    fn test_direct_erc1155_on_mainnet_ignores_erc721_fields() {
        let mode = select_mode(ChainId::new(1).unwrap(), ContractStandard::Erc1155);
        assert_eq!(mode, DeploymentMode::Direct);

        let params = DeploymentParams {
            name: "Game Items".to_string(),
            symbol: String::new(),
            asset_uri: "https://gw/ipfs/abc".to_string(),
            max_supply: "not a number".to_string(),
        };
        let plan = assemble(chain(1), mode, ContractStandard::Erc1155, &params).unwrap();

        assert_eq!(
            plan,
            CallPlan::Direct(ConstructorArgs::Erc1155 {
                uri: "https://gw/ipfs/abc".to_string()
            })
        );
        assert_eq!(plan.function(), "constructor");
    }

    #[test]
    fn test_direct_erc721() {
        let plan = assemble(
            chain(1),
            DeploymentMode::Direct,
            ContractStandard::Erc721,
            &erc721_params(),
        )
        .unwrap();
        assert!(matches!(plan, CallPlan::Direct(ConstructorArgs::Erc721(_))));
        assert_eq!(plan.standard(), ContractStandard::Erc721);
    }

    #[test]
    fn test_validation_failures() {
        let cases: Vec<(ContractStandard, DeploymentParams)> = vec![
            (
                ContractStandard::Erc721,
                DeploymentParams { name: String::new(), ..erc721_params() },
            ),
            (
                ContractStandard::Erc721,
                DeploymentParams { symbol: "  ".to_string(), ..erc721_params() },
            ),
            (
                ContractStandard::Erc721,
                DeploymentParams { asset_uri: String::new(), ..erc721_params() },
            ),
            (
                ContractStandard::Erc721,
                DeploymentParams { max_supply: String::new(), ..erc721_params() },
            ),
            (
                ContractStandard::Erc721,
                DeploymentParams { max_supply: "1e4".to_string(), ..erc721_params() },
            ),
            (
                ContractStandard::Erc1155,
                DeploymentParams { name: String::new(), ..erc721_params() },
            ),
            (
                ContractStandard::Erc1155,
                DeploymentParams { asset_uri: String::new(), ..erc721_params() },
            ),
        ];

        for (standard, params) in cases {
            let result = assemble(chain(1), DeploymentMode::Direct, standard, &params);
            assert!(
                matches!(result, Err(LaunchpadError::Validation(_))),
                "{standard} {params:?} should fail validation"
            );
        }
    }

    #[test]
    fn test_validate_parses_fields_per_standard() {
        let ctor = erc721_params().validate(ContractStandard::Erc721).unwrap();
        assert!(matches!(
            ctor,
            ConstructorArgs::Erc721(CollectionArgs { max_supply, .. }) if max_supply == U256::from(10000)
        ));

        let params = DeploymentParams {
            symbol: String::new(),
            max_supply: String::new(),
            ..erc721_params()
        };
        assert!(params.validate(ContractStandard::Erc721).is_err());
        assert_eq!(
            params.validate(ContractStandard::Erc1155).unwrap(),
            ConstructorArgs::Erc1155 { uri: "https://gw/ipfs/abc".to_string() }
        );
    }

    #[test]
    fn test_missing_chain_fails_validation() {
        let result = assemble(
            None,
            DeploymentMode::Direct,
            ContractStandard::Erc721,
            &erc721_params(),
        );
        assert!(matches!(result, Err(LaunchpadError::Validation(_))));
    }

    #[test]
    fn test_factory_mode_without_factory_fails() {
        let result = assemble(
            chain(1),
            DeploymentMode::Factory,
            ContractStandard::Erc721,
            &erc721_params(),
        );
        assert!(matches!(result, Err(LaunchpadError::Validation(_))));

        let result = assemble(
            chain(11155111),
            DeploymentMode::Factory,
            ContractStandard::Erc1155,
            &erc721_params(),
        );
        assert!(matches!(result, Err(LaunchpadError::Validation(_))));
    }

    #[test]
    fn test_factory_transaction_targets_factory() {
        let plan = assemble(
            chain(11155111),
            DeploymentMode::Factory,
            ContractStandard::Erc721,
            &erc721_params(),
        )
        .unwrap();

        let tx = plan.transaction(ME, &ContractArtifacts::default()).unwrap();
        assert_eq!(tx.from, ME);
        assert_eq!(tx.to, Some(address!("1234567890123456789012345678901234567890")));
        assert_eq!(&tx.data[..4], &CollectionFactory::deployCollectionCall::SELECTOR);

        let decoded = CollectionFactory::deployCollectionCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(decoded.symbol, "BAYC");
        assert_eq!(decoded.maxSupply, U256::from(10000));
    }

    #[test]
    fn test_direct_transaction_appends_constructor_args() {
        let bytecode = Bytes::from_static(&[0x60, 0x80, 0x60, 0x40]);
        let artifacts = ContractArtifacts::new(None, Some(bytecode.clone()));
        let plan = CallPlan::Direct(ConstructorArgs::Erc1155 {
            uri: "https://gw/ipfs/abc".to_string(),
        });

        let tx = plan.transaction(ME, &artifacts).unwrap();
        assert_eq!(tx.to, None);
        assert!(tx.data.starts_with(&bytecode));
        assert_eq!(tx.data.len(), bytecode.len() + 96);
    }

    #[test]
    fn test_direct_transaction_requires_artifact() {
        let plan = assemble(
            chain(1),
            DeploymentMode::Direct,
            ContractStandard::Erc721,
            &erc721_params(),
        )
        .unwrap();
        assert!(matches!(
            plan.transaction(ME, &ContractArtifacts::default()),
            Err(LaunchpadError::InvalidBytecode { .. })
        ));
    }

    #[test]
    fn test_mint_request_parsing() {
        assert_eq!(MintRequest::erc721("3").unwrap(), MintRequest::Erc721 { quantity: 3 });
        assert!(MintRequest::erc721("0").is_err());
        assert!(MintRequest::erc721("21").is_err());
        assert!(MintRequest::erc721("two").is_err());

        assert_eq!(
            MintRequest::erc1155("1", "5").unwrap(),
            MintRequest::Erc1155 { token_id: U256::from(1), amount: U256::from(5) }
        );
        assert!(MintRequest::erc1155("1", "0").is_err());
        assert!(MintRequest::erc1155("x", "1").is_err());
    }

    #[test]
    fn test_plan_mint_sequential_expands_quantity() {
        let price = U256::from(1_000);
        let txs = plan_mint(
            COLLECTION,
            ME,
            &MintRequest::Erc721 { quantity: 3 },
            MintStrategy::Sequential,
            price,
        );

        assert_eq!(txs.len(), 3);
        for tx in &txs {
            assert_eq!(tx.to, Some(COLLECTION));
            assert_eq!(tx.value, price);
            let call = ERC721Launchpad::mintCall::abi_decode(&tx.data, true).unwrap();
            assert_eq!(call.quantity, U256::from(1));
        }
    }

    #[test]
    fn test_plan_mint_native_batches() {
        let txs = plan_mint(
            COLLECTION,
            ME,
            &MintRequest::Erc721 { quantity: 3 },
            MintStrategy::Native,
            U256::from(1_000),
        );

        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].value, U256::from(3_000));
        let call = ERC721Launchpad::mintCall::abi_decode(&txs[0].data, true).unwrap();
        assert_eq!(call.quantity, U256::from(3));
    }

    #[test]
    fn test_plan_mint_erc1155_single_call_to_self() {
        for strategy in [MintStrategy::Sequential, MintStrategy::Native] {
            let txs = plan_mint(
                COLLECTION,
                ME,
                &MintRequest::Erc1155 { token_id: U256::from(7), amount: U256::from(50) },
                strategy,
                U256::from(1_000),
            );

            assert_eq!(txs.len(), 1);
            assert_eq!(txs[0].value, U256::ZERO);
            let call = ERC1155Launchpad::mintCall::abi_decode(&txs[0].data, true).unwrap();
            assert_eq!(call.account, ME);
            assert_eq!(call.id, U256::from(7));
            assert_eq!(call.amount, U256::from(50));
            assert!(call.data.is_empty());
        }
    }
}
