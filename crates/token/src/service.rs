use crate::{
    error::Operation,
    identity::{parse_public_key, Recipient},
    ConnectedData, ServiceError, TokenBalance, TokenMetadata, ValidationError,
};
use alloy_primitives::{B256, U256};
use client::{
    rpc::{self, CallRequest},
    wallet::{self, SendTransaction, WalletProvider},
    ClientError, HttpTransport, Transport,
};
use codec::{
    decode_return_value, encode_function_call, revert_reason, to_fixed_point, validate_amount,
    DecodedValue, Method, MethodHashes, Param,
};
use config::{AppConfig, NetworkConfig, TokenConfig};
use tracing::{debug, info, warn};

/// Reads and writes against one configured token contract.
pub struct TokenService<T> {
    transport: T,
    network: NetworkConfig,
    token: TokenConfig,
    hashes: MethodHashes,
}

impl TokenService<HttpTransport> {
    /// Build the service over HTTP from a loaded configuration.
    pub fn connect(config: &AppConfig) -> Result<Self, ClientError> {
        let transport =
            client::create_transport(&config.network.rpc_url, config.network.request_timeout)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> TokenService<T> {
    pub fn new(transport: T, config: &AppConfig) -> Self {
        Self {
            transport,
            network: config.network.clone(),
            token: config.token.clone(),
            hashes: MethodHashes::from_config(&config.method_hashes),
        }
    }

    /// Replace the configured selector table.
    pub fn with_method_hashes(mut self, hashes: MethodHashes) -> Self {
        self.hashes = hashes;
        self
    }

    pub fn token_address(&self) -> &str {
        &self.token.token_address
    }

    pub fn spender_address(&self) -> &str {
        &self.token.spender_address
    }

    pub const fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Fetch name, symbol, decimals and both supplies in one round of calls.
    pub async fn get_token_metadata(&self) -> Result<TokenMetadata, ServiceError> {
        let op = Operation::FetchMetadata;
        let decode = ServiceError::decode(op);

        let (name, symbol, decimals, max_supply, total_supply) = tokio::try_join!(
            self.read(op, Method::Name, &[], "string"),
            self.read(op, Method::Symbol, &[], "string"),
            self.read_decimals(op),
            self.read_u256(op, Method::MaxSupply, &[]),
            self.read_u256(op, Method::TotalSupply, &[]),
        )?;

        Ok(TokenMetadata {
            name: name.into_string().map_err(&decode)?,
            symbol: symbol.into_string().map_err(&decode)?,
            decimals,
            max_supply,
            total_supply,
        })
    }

    /// Balance of `identity` and its allowance for the configured spender.
    pub async fn get_balance(&self, identity: &str) -> Result<TokenBalance, ServiceError> {
        let op = Operation::FetchBalance;
        let (owner, spender) = tokio::try_join!(
            self.resolve(op, identity),
            self.resolve(op, &self.token.spender_address),
        )?;

        self.balance_of(op, owner, spender).await
    }

    /// Balance, allowance and network name for the connected account.
    ///
    /// Fails with [`ServiceError::MissingIdentity`] before any request when
    /// no account is given.
    pub async fn get_connected_data(
        &self,
        identity: Option<&str>,
    ) -> Result<ConnectedData, ServiceError> {
        let identity = identity
            .filter(|id| !id.trim().is_empty())
            .ok_or(ServiceError::MissingIdentity)?;
        let op = Operation::FetchConnectedData;

        let (owner, spender) = tokio::try_join!(
            self.resolve(op, identity),
            self.resolve(op, &self.token.spender_address),
        )?;

        let (balance, chain_id) = tokio::try_join!(self.balance_of(op, owner, spender), async {
            rpc::chain_id(&self.transport)
                .await
                .map_err(ServiceError::rpc(op))
        })?;

        Ok(ConnectedData {
            user_balance: balance.balance,
            allowance: balance.allowance,
            network_name: self.network.network_name(chain_id),
        })
    }

    /// Resolve a public key or address to the key contracts use.
    pub async fn resolve_identity(&self, identity: &str) -> Result<B256, ServiceError> {
        self.resolve(Operation::ResolveAddress, identity).await
    }

    /// Transfer `amount` (human-readable, e.g. `"1.5"`) from `sender` to `recipient`.
    ///
    /// The call is simulated first and only handed to the wallet when the
    /// simulation succeeds. Returns the transaction id.
    pub async fn transfer_tokens<W: WalletProvider>(
        &self,
        wallet: &W,
        recipient: &str,
        amount: &str,
        sender: &str,
    ) -> Result<String, ServiceError> {
        let op = Operation::Transfer;
        let sender = require_sender(sender)?;
        let recipient = Recipient::parse(recipient).ok_or_else(|| {
            ServiceError::invalid(op, ValidationError::InvalidRecipient(recipient.to_string()))
        })?;
        validate_amount(amount).map_err(|e| ServiceError::invalid(op, e))?;

        let decimals = self.read_decimals(op).await?;
        let amount = to_fixed_point(amount, decimals).map_err(|e| ServiceError::invalid(op, e))?;
        let to = self.resolve_recipient(op, recipient).await?;

        let data = encode_function_call(
            Method::Transfer,
            &[Param::Address(to), Param::Uint(amount)],
            &self.hashes,
        )
        .map_err(ServiceError::decode(op))?;

        info!(%amount, recipient = %to, sender, "Submitting transfer");
        self.simulate_and_send(op, wallet, sender, data).await
    }

    /// Let the configured spender move up to `amount` of `sender`'s tokens.
    pub async fn approve_tokens<W: WalletProvider>(
        &self,
        wallet: &W,
        amount: &str,
        sender: &str,
    ) -> Result<String, ServiceError> {
        let op = Operation::Approve;
        let sender = require_sender(sender)?;
        validate_amount(amount).map_err(|e| ServiceError::invalid(op, e))?;

        let decimals = self.read_decimals(op).await?;
        let amount = to_fixed_point(amount, decimals).map_err(|e| ServiceError::invalid(op, e))?;
        let spender = self.resolve(op, &self.token.spender_address).await?;

        let data = encode_function_call(
            Method::Approve,
            &[Param::Address(spender), Param::Uint(amount)],
            &self.hashes,
        )
        .map_err(ServiceError::decode(op))?;

        info!(%amount, spender = %spender, sender, "Submitting approval");
        self.simulate_and_send(op, wallet, sender, data).await
    }

    async fn simulate_and_send<W: WalletProvider>(
        &self,
        op: Operation,
        wallet: &W,
        sender: &str,
        data: String,
    ) -> Result<String, ServiceError> {
        let call = CallRequest {
            to: self.token.token_address.clone(),
            data,
            from: Some(sender.to_string()),
        };

        match rpc::eth_call(&self.transport, &call).await {
            Ok(output) => {
                let succeeded = output.trim_start_matches("0x").is_empty()
                    || decode_return_value(&output, "bool")
                        .and_then(DecodedValue::into_bool)
                        .map_err(ServiceError::decode(op))?;

                if !succeeded {
                    warn!(%op, "Simulation returned false, not broadcasting");
                    return Err(ServiceError::Reverted {
                        operation: op,
                        reason: "call returned false".to_string(),
                    });
                }
            }
            Err(err) if err.is_revert() => {
                let reason = err
                    .revert_data()
                    .and_then(revert_reason)
                    .unwrap_or_else(|| err.to_string());
                warn!(%op, %reason, "Simulation reverted, not broadcasting");
                return Err(ServiceError::Reverted {
                    operation: op,
                    reason,
                });
            }
            Err(err) => return Err(ServiceError::rpc(op)(err)),
        }

        debug!(%op, "Simulation succeeded");

        let tx = SendTransaction::contract_call(
            sender,
            &self.token.token_address,
            call.data,
            self.token.max_spend,
        );
        wallet::send_transaction(wallet, &tx)
            .await
            .map_err(ServiceError::rpc(op))
    }

    async fn balance_of(
        &self,
        op: Operation,
        owner: B256,
        spender: B256,
    ) -> Result<TokenBalance, ServiceError> {
        let balance_params = [Param::Address(owner)];
        let allowance_params = [Param::Address(owner), Param::Address(spender)];

        let (balance, allowance) = tokio::try_join!(
            self.read_u256(op, Method::BalanceOf, &balance_params),
            self.read_u256(op, Method::Allowance, &allowance_params),
        )?;

        Ok(TokenBalance { balance, allowance })
    }

    async fn resolve(&self, op: Operation, input: &str) -> Result<B256, ServiceError> {
        let recipient = Recipient::parse(input).ok_or_else(|| {
            ServiceError::invalid(op, ValidationError::InvalidRecipient(input.to_string()))
        })?;
        self.resolve_recipient(op, recipient).await
    }

    async fn resolve_recipient(
        &self,
        op: Operation,
        recipient: Recipient,
    ) -> Result<B256, ServiceError> {
        match recipient {
            Recipient::PublicKey(key) => Ok(key),
            Recipient::Address { address, kind } => {
                debug!(%address, ?kind, "Resolving address to public key");
                let key = rpc::public_key_info(&self.transport, &address)
                    .await
                    .map_err(ServiceError::rpc(op))?;

                key.as_deref()
                    .and_then(parse_public_key)
                    .ok_or_else(|| ServiceError::invalid(op, ValidationError::UnknownAddress(address)))
            }
        }
    }

    async fn read_decimals(&self, op: Operation) -> Result<u8, ServiceError> {
        self.read(op, Method::Decimals, &[], "uint8")
            .await?
            .into_u8()
            .map_err(ServiceError::decode(op))
    }

    async fn read_u256(
        &self,
        op: Operation,
        method: Method,
        params: &[Param],
    ) -> Result<U256, ServiceError> {
        self.read(op, method, params, "uint256")
            .await?
            .into_u256()
            .map_err(ServiceError::decode(op))
    }

    async fn read(
        &self,
        op: Operation,
        method: Method,
        params: &[Param],
        return_type: &str,
    ) -> Result<DecodedValue, ServiceError> {
        let data =
            encode_function_call(method, params, &self.hashes).map_err(ServiceError::decode(op))?;

        debug!(
            method = method.signature(),
            token = %self.token.token_address,
            "Calling contract"
        );

        let call = CallRequest {
            to: self.token.token_address.clone(),
            data,
            from: None,
        };
        let output = rpc::eth_call(&self.transport, &call)
            .await
            .map_err(ServiceError::rpc(op))?;

        decode_return_value(&output, return_type).map_err(ServiceError::decode(op))
    }
}

fn require_sender(sender: &str) -> Result<&str, ServiceError> {
    let sender = sender.trim();
    if sender.is_empty() {
        Err(ServiceError::MissingIdentity)
    } else {
        Ok(sender)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        identity::fixtures::P2TR,
        test_utils::{
            abi_string, app_config, key_hex, word, Answer, Node, Wallet, SELECTOR_ALLOWANCE,
            SELECTOR_APPROVE, SELECTOR_BALANCE_OF, SELECTOR_DECIMALS, SELECTOR_MAX_SUPPLY,
            SELECTOR_NAME, SELECTOR_SYMBOL, SELECTOR_TOTAL_SUPPLY, SELECTOR_TRANSFER, SENDER,
            SPENDER_KEY,
        },
        ValidationError,
    };
    use alloy_primitives::hex;
    use client::rpc::GET_PUBLIC_KEYS_INFO;
    use codec::AmountError;

    fn token_node() -> Node {
        Node::new()
            .answer(SELECTOR_NAME, Answer::Output(abi_string("Motoswap")))
            .answer(SELECTOR_SYMBOL, Answer::Output(abi_string("MOTO")))
            .answer(SELECTOR_DECIMALS, Answer::Output(word(U256::from(18))))
            .answer(
                SELECTOR_MAX_SUPPLY,
                Answer::Output(word(U256::from(1_000_000_000u64))),
            )
            .answer(SELECTOR_TOTAL_SUPPLY, Answer::Output(word(U256::from(5_000u64))))
            .answer(SELECTOR_BALANCE_OF, Answer::Output(word(U256::from(700u64))))
            .answer(SELECTOR_ALLOWANCE, Answer::Output(word(U256::from(30u64))))
            .answer(SELECTOR_TRANSFER, Answer::Output(word(U256::from(1))))
            .answer(SELECTOR_APPROVE, Answer::Output(word(U256::from(1))))
    }

    fn service(node: &Node) -> TokenService<&Node> {
        TokenService::new(node, &app_config())
    }

    fn simulated_calldata(node: &Node) -> Option<String> {
        node.requests()
            .into_iter()
            .find(|(method, params)| method == rpc::ETH_CALL && params[0].get("from").is_some())
            .and_then(|(_, params)| params[0]["data"].as_str().map(str::to_string))
    }

    #[tokio::test]
    async fn test_get_token_metadata() {
        let node = token_node();
        let metadata = service(&node).get_token_metadata().await.unwrap();

        assert_eq!(
            metadata,
            TokenMetadata {
                name: "Motoswap".to_string(),
                symbol: "MOTO".to_string(),
                decimals: 18,
                max_supply: U256::from(1_000_000_000u64),
                total_supply: U256::from(5_000u64),
            }
        );
    }

    #[tokio::test]
    async fn test_metadata_failure_is_wrapped() {
        let node = token_node().answer(SELECTOR_SYMBOL, Answer::Unreachable);
        let err = service(&node).get_token_metadata().await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Rpc {
                operation: Operation::FetchMetadata,
                ..
            }
        ));
        assert!(err.to_string().starts_with("Failed to fetch token metadata"));
    }

    #[tokio::test]
    async fn test_metadata_with_unconfigured_hash() {
        let node = token_node();
        let service = service(&node).with_method_hashes(
            MethodHashes::new()
                .with(Method::Name, SELECTOR_NAME)
                .with(Method::Symbol, SELECTOR_SYMBOL),
        );

        let err = service.get_token_metadata().await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Decode {
                operation: Operation::FetchMetadata,
                source: codec::CodecError::UnconfiguredMethod(_),
            }
        ));
    }

    #[tokio::test]
    async fn test_connected_data_requires_identity() {
        let node = token_node();

        let err = service(&node).get_connected_data(None).await.unwrap_err();
        assert!(matches!(err, ServiceError::MissingIdentity));
        assert!(node.requests().is_empty());
    }

    #[tokio::test]
    async fn test_connected_data() {
        let node = token_node();
        let data = service(&node)
            .get_connected_data(Some(&key_hex(0x33)))
            .await
            .unwrap();

        assert_eq!(
            data,
            ConnectedData {
                user_balance: U256::from(700u64),
                allowance: U256::from(30u64),
                network_name: "regtest".to_string(),
            }
        );

        let allowance_call = node
            .requests()
            .into_iter()
            .filter_map(|(_, params)| params[0]["data"].as_str().map(str::to_string))
            .find(|data| data.starts_with(&format!("0x{SELECTOR_ALLOWANCE}")))
            .unwrap();
        assert!(allowance_call.ends_with(&hex::encode(SPENDER_KEY)));
    }

    #[tokio::test]
    async fn test_get_balance_resolves_address() {
        let node = token_node().key(P2TR, &key_hex(0x44));
        let balance = service(&node).get_balance(P2TR).await.unwrap();

        assert_eq!(balance.balance, U256::from(700u64));
        assert_eq!(node.count(GET_PUBLIC_KEYS_INFO), 1);
    }

    #[tokio::test]
    async fn test_transfer_one_and_a_half_tokens() {
        let node = token_node();
        let wallet = Wallet::new("0xabc123");

        let tx_id = service(&node)
            .transfer_tokens(&wallet, &key_hex(0x55), "1.5", SENDER)
            .await
            .unwrap();
        assert_eq!(tx_id, "0xabc123");

        let data = simulated_calldata(&node).unwrap();
        assert_eq!(
            data,
            format!(
                "0x{SELECTOR_TRANSFER}{}{}",
                "55".repeat(32),
                hex::encode(U256::from(1_500_000_000_000_000_000u128).to_be_bytes::<32>())
            )
        );

        let sent = wallet.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["data"], data);
        assert_eq!(sent[0]["from"], SENDER);
        assert_eq!(sent[0]["feeRate"], "auto");
        assert_eq!(sent[0]["maximumAllowedSpend"], 10_000);
    }

    #[tokio::test]
    async fn test_public_key_recipient_skips_resolution() {
        let node = token_node();
        let wallet = Wallet::new("0x01");

        service(&node)
            .transfer_tokens(&wallet, &key_hex(0x55), "1", SENDER)
            .await
            .unwrap();

        assert_eq!(node.count(GET_PUBLIC_KEYS_INFO), 0);
    }

    #[tokio::test]
    async fn test_address_recipient_is_resolved() {
        let node = token_node().key(P2TR, &key_hex(0x66));
        let wallet = Wallet::new("0x01");

        service(&node)
            .transfer_tokens(&wallet, P2TR, "2", SENDER)
            .await
            .unwrap();

        assert_eq!(node.count(GET_PUBLIC_KEYS_INFO), 1);
        let data = simulated_calldata(&node).unwrap();
        assert_eq!(&data[10..74], "66".repeat(32));
    }

    #[tokio::test]
    async fn test_unknown_address_is_rejected() {
        let node = token_node();
        let wallet = Wallet::new("0x01");

        let err = service(&node)
            .transfer_tokens(&wallet, P2TR, "2", SENDER)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation {
                source: ValidationError::UnknownAddress(_),
                ..
            }
        ));
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_recipient_sends_nothing() {
        let node = token_node();
        let wallet = Wallet::new("0x01");

        let err = service(&node)
            .transfer_tokens(&wallet, "not-an-address", "1", SENDER)
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(node.requests().is_empty());
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_non_positive_amount_is_rejected() {
        let node = token_node();
        let wallet = Wallet::new("0x01");

        let err = service(&node)
            .transfer_tokens(&wallet, &key_hex(0x55), "0", SENDER)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation {
                source: ValidationError::Amount(AmountError::NotPositive),
                ..
            }
        ));
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_bad_amount_fails_before_any_request() {
        // Nothing answered, so any request would surface as a network error.
        let node = Node::new();
        let wallet = Wallet::new("0x01");
        let service = service(&node);

        for amount in ["0", "-1", "abc", ""] {
            let err = service
                .transfer_tokens(&wallet, P2TR, amount, SENDER)
                .await
                .unwrap_err();
            assert!(err.is_validation(), "transfer {amount:?}: {err}");

            let err = service.approve_tokens(&wallet, amount, SENDER).await.unwrap_err();
            assert!(err.is_validation(), "approve {amount:?}: {err}");
        }

        assert!(node.requests().is_empty());
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_revert_never_broadcasts() {
        // Error("insufficient balance")
        let revert = concat!(
            "0x08c379a0",
            "0000000000000000000000000000000000000000000000000000000000000020",
            "0000000000000000000000000000000000000000000000000000000000000014",
            "696e73756666696369656e742062616c616e6365000000000000000000000000"
        );
        let node = token_node().answer(SELECTOR_TRANSFER, Answer::Revert(Some(revert.to_string())));
        let wallet = Wallet::new("0x01");

        let err = service(&node)
            .transfer_tokens(&wallet, &key_hex(0x55), "1", SENDER)
            .await
            .unwrap_err();

        match err {
            ServiceError::Reverted { operation, reason } => {
                assert_eq!(operation, Operation::Transfer);
                assert!(reason.contains("insufficient balance"), "{reason}");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_revert_without_data_uses_message() {
        let node = token_node().answer(SELECTOR_TRANSFER, Answer::Revert(None));
        let wallet = Wallet::new("0x01");

        let err = service(&node)
            .transfer_tokens(&wallet, &key_hex(0x55), "1", SENDER)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Reverted { .. }));
        assert!(err.to_string().contains("execution reverted"));
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_false_simulation_never_broadcasts() {
        let node = token_node().answer(SELECTOR_TRANSFER, Answer::Output(word(U256::ZERO)));
        let wallet = Wallet::new("0x01");

        let err = service(&node)
            .transfer_tokens(&wallet, &key_hex(0x55), "1", SENDER)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Reverted { .. }));
        assert!(wallet.sent().is_empty());
    }

    #[tokio::test]
    async fn test_transfer_requires_sender() {
        let node = token_node();
        let wallet = Wallet::new("0x01");

        let err = service(&node)
            .transfer_tokens(&wallet, &key_hex(0x55), "1", " ")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::MissingIdentity));
    }

    #[tokio::test]
    async fn test_approve_targets_spender() {
        let node = token_node();
        let wallet = Wallet::new("0xbeef");

        let tx_id = service(&node)
            .approve_tokens(&wallet, "3", SENDER)
            .await
            .unwrap();
        assert_eq!(tx_id, "0xbeef");

        let data = simulated_calldata(&node).unwrap();
        assert!(data.starts_with(&format!("0x{SELECTOR_APPROVE}{}", hex::encode(SPENDER_KEY))));
    }
}
