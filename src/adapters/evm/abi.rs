//! Contract bindings

use alloy::sol;

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface Factory {
        struct TokenSale {
            address token;
            string name;
            string symbol;
            address creator;
            uint256 sold;
            uint256 raised;
            bool isOpen;
        }

        event Created(address indexed token);
        event Buy(address indexed token, uint256 amount);

        function fee() external view returns (uint256);
        function getAllTokenDetails() external view returns (TokenSale[] memory);
        function getTokenDetails(address token) external view returns (TokenSale memory);
        function calculateCost(address token, uint256 amount) external view returns (uint256);

        function create(string memory name, string memory symbol) external payable;
        function buy(address token, uint256 amount) external payable;
        function sell(address token, uint256 amount) external;
    }
}

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface CopyTrading {
        struct TraderInfo {
            address traderAddress;
            string name;
            uint256 minimumInvestment;
            uint256 profitSharingPercentage;
            uint256 totalPoolValue;
            uint256 totalInvestors;
            uint256 totalTrades;
            bool isActive;
        }

        event TraderRegistered(address indexed trader, string name);
        event Invested(address indexed investor, address indexed trader, uint256 amount);
        event Withdrawn(address indexed investor, address indexed trader, uint256 amount);
        event TradeExecuted(address indexed trader, address indexed token, uint256 amount);

        function getAllTraderDetails() external view returns (TraderInfo[] memory);
        function getTraderDetails(address trader) external view returns (TraderInfo memory);
        function getUserInvestment(address user, address trader) external view returns (uint256);
        function getUserPortfolioValue(address user) external view returns (uint256);

        function registerTrader(string memory name, uint256 minimumInvestment, uint256 profitSharingPercentage) external;
        function invest(address trader) external payable;
        function buyToken(address token, uint256 amount) external;
        function withdraw(address trader) external;
    }
}
