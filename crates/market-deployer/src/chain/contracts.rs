//! Compile-time ABI definitions for the deployer and everything it touches,
//! via Alloy `sol!`.
//!
//! The deploy argument structs are positional tuples on the wire; their field
//! order below is the contract's order and must not be rearranged.

#![allow(clippy::too_many_arguments)]

use alloy::sol;

// ---------------------------------------------------------------------------
// SiloDeployer deploy arguments
// ---------------------------------------------------------------------------

sol! {
    /// Oracle slot: either an already deployed oracle or a factory call.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct OracleCreationTxData {
        address deployed;
        address factory;
        bytes txInput;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct Oracles {
        OracleCreationTxData solvencyOracle0;
        OracleCreationTxData maxLtvOracle0;
        OracleCreationTxData solvencyOracle1;
        OracleCreationTxData maxLtvOracle1;
    }

    /// Hook receiver implementation to clone, plus its `initialize` payload.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct ClonableHookReceiver {
        address implementation;
        bytes initializationData;
    }

    /// `ISiloConfig.InitData`: 24 fields, contract order.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct InitData {
        address deployer;
        address hookReceiver;
        uint256 deployerFee;
        uint256 daoFee;
        address token0;
        address solvencyOracle0;
        address maxLtvOracle0;
        address interestRateModel0;
        uint256 maxLtv0;
        uint256 lt0;
        uint256 liquidationTargetLtv0;
        uint256 liquidationFee0;
        uint256 flashloanFee0;
        bool callBeforeQuote0;
        address token1;
        address solvencyOracle1;
        address maxLtvOracle1;
        address interestRateModel1;
        uint256 maxLtv1;
        uint256 lt1;
        uint256 liquidationTargetLtv1;
        uint256 liquidationFee1;
        uint256 flashloanFee1;
        bool callBeforeQuote1;
    }

    interface ISiloDeployer {
        function deploy(
            Oracles calldata _oracles,
            bytes calldata _irmConfigData0,
            bytes calldata _irmConfigData1,
            ClonableHookReceiver calldata _clonableHookReceiver,
            InitData memory _siloInitData
        ) external returns (address siloConfig);
    }

    interface ISiloFactory {
        event NewSilo(
            address indexed implementation,
            address indexed token0,
            address indexed token1,
            address silo0,
            address silo1,
            address siloConfig
        );
    }
}

// ---------------------------------------------------------------------------
// Interest rate models
// ---------------------------------------------------------------------------

sol! {
    /// Legacy (v2) model config. The factory rejects out-of-bounds values.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct InterestRateModelV2Config {
        int256 uopt;
        int256 ucrit;
        int256 ulow;
        int256 ki;
        int256 kcrit;
        int256 klow;
        int256 klin;
        int256 beta;
        int112 ri;
        int112 Tcrit;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct DynamicKinkConfig {
        int256 ulow;
        int256 u1;
        int256 u2;
        int256 ucrit;
        int256 rmin;
        int96 kmin;
        int96 kmax;
        int256 alpha;
        int256 cminus;
        int256 cplus;
        int256 c1;
        int256 c2;
        int256 dmax;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct DynamicKinkImmutableArgs {
        uint32 timelock;
        int96 rcompCap;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct DynamicKinkModelState {
        int96 k;
        uint64 timestamp;
    }

    interface IInterestRateModelV2 {
        function getConfig(address _silo) external view returns (InterestRateModelV2Config memory);
    }

    interface IDynamicKinkModel {
        function getModelStateAndConfig(bool _usePending) external view returns (
            DynamicKinkModelState memory state,
            DynamicKinkConfig memory config,
            DynamicKinkImmutableArgs memory immutableArgs
        );
    }
}

// ---------------------------------------------------------------------------
// Oracle factories
// ---------------------------------------------------------------------------

sol! {
    #[derive(Debug, Default, PartialEq, Eq)]
    struct ChainlinkV3DeploymentConfig {
        address baseToken;
        address quoteToken;
        address primaryAggregator;
        uint32 primaryHeartbeat;
        address secondaryAggregator;
        uint32 secondaryHeartbeat;
        uint256 normalizationDivider;
        uint256 normalizationMultiplier;
        bool invertSecondPrice;
    }

    #[derive(Debug, Default, PartialEq, Eq)]
    struct PTLinearDeploymentConfig {
        address ptToken;
        uint256 maxYield;
        address hardcodedQuoteToken;
    }

    interface IChainlinkV3OracleFactory {
        function create(ChainlinkV3DeploymentConfig calldata _config, bytes32 _externalSalt)
            external returns (address oracle);
    }

    interface IPTLinearOracleFactory {
        function create(PTLinearDeploymentConfig memory _config, bytes32 _externalSalt)
            external returns (address oracle);
    }

    interface IOracleScalerFactory {
        function createOracleScaler(address _quoteToken, bytes32 _externalSalt)
            external returns (address oracleScaler);
    }

    interface IManageableOracleFactory {
        function create(address _oracle, address _owner, uint32 _timelock, bytes32 _externalSalt)
            external returns (address manageableOracle);

        function create(
            address _underlyingOracleFactory,
            bytes calldata _underlyingOracleInitData,
            address _owner,
            uint32 _timelock,
            bytes32 _externalSalt
        ) external returns (address manageableOracle);
    }

    /// Every factory records what it created.
    interface ICreatedInFactory {
        function createdInFactory(address _contract) external view returns (bool);
    }
}

// ---------------------------------------------------------------------------
// Read surface used by the snapshot reader and the checks
// ---------------------------------------------------------------------------

sol! {
    /// `ISiloConfig.ConfigData`, as returned for one silo.
    #[derive(Debug, Default, PartialEq, Eq)]
    struct ConfigData {
        uint256 daoFee;
        uint256 deployerFee;
        address silo;
        address token;
        address protectedShareToken;
        address collateralShareToken;
        address debtShareToken;
        address solvencyOracle;
        address maxLtvOracle;
        address interestRateModel;
        uint256 maxLtv;
        uint256 lt;
        uint256 liquidationTargetLtv;
        uint256 liquidationFee;
        uint256 flashloanFee;
        address hookReceiver;
        bool callBeforeQuote;
    }

    interface ISiloConfig {
        function getSilos() external view returns (address silo0, address silo1);
        function getConfig(address _silo) external view returns (ConfigData memory);
    }

    interface ISiloOracle {
        function quote(uint256 _baseAmount, address _baseToken) external view returns (uint256 quoteAmount);
        function quoteToken() external view returns (address);
    }

    interface IERC20Metadata {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string memory);
    }

    interface IOwnable {
        function owner() external view returns (address);
    }

    interface IOracleScaler {
        function SCALE_FACTOR() external view returns (uint256);
    }

    interface IChainlinkV3Oracle {
        function oracleConfig() external view returns (address);
    }

    interface IPTLinearOracle {
        function baseDiscountPerYear() external view returns (uint256);
    }

    interface IManageableOracle {
        function oracle() external view returns (address);
        function timelock() external view returns (uint32);
    }
}
