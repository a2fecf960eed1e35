use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError, UrlencodedError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derivative::Derivative;
use mongodb::bson::ser::Error as BsonError;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};

use crate::auth::UserId;
use crate::campaign::{CampaignId, CampaignStatus};
use crate::coupon::CouponId;
use crate::notification::NotificationId;
use crate::participation::{ParticipationId, ParticipationStatus};

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq, Eq)]
#[serde(untagged)]
pub enum Error {
    // 400
    #[serde(serialize_with = "display")]
    InvalidJson(#[derivative(PartialEq = "ignore")] JsonPayloadError),
    #[serde(serialize_with = "display")]
    InvalidPath(#[derivative(PartialEq = "ignore")] PathError),
    #[serde(serialize_with = "display")]
    InvalidForm(#[derivative(PartialEq = "ignore")] UrlencodedError),
    #[serde(serialize_with = "display")]
    InvalidQuery(#[derivative(PartialEq = "ignore")] QueryPayloadError),
    MissingCouponCode,
    InvalidDateRange,
    NonPositiveCouponValue,

    // 401
    NotAuthenticated,

    // 403
    OnlyBrandsMayCreateCampaigns {
        user_id: UserId,
    },
    OnlyBrandsMayRedeemCoupons {
        user_id: UserId,
    },
    OnlyCreatorsMayJoinCampaigns {
        user_id: UserId,
    },
    CampaignNotOwnedByBrand {
        campaign_id: CampaignId,
        brand_id: UserId,
    },
    CouponNotOwnedByBrand {
        coupon_id: CouponId,
        brand_id: UserId,
    },

    // 404
    PathDoesNotExist,
    CampaignDoesNotExist {
        campaign_id: CampaignId,
    },
    ParticipationDoesNotExist {
        participation_id: ParticipationId,
    },
    NotificationDoesNotExist {
        notification_id: NotificationId,
    },
    CouponNotFoundOrExpired {
        code: String,
    },

    // 409
    CouponAlreadyRedeemed {
        coupon_id: CouponId,
    },
    AlreadyParticipating {
        campaign_id: CampaignId,
        creator_id: UserId,
    },
    CampaignNotAcceptingParticipants {
        campaign_id: CampaignId,
        status: CampaignStatus,
    },
    CampaignNotPublishable {
        campaign_id: CampaignId,
    },
    ParticipationNotApprovable {
        participation_id: ParticipationId,
        status: ParticipationStatus,
    },
    ParticipationAlreadyHasCoupon {
        participation_id: ParticipationId,
    },
    CouponRequiresActiveParticipation {
        participation_id: ParticipationId,
        status: ParticipationStatus,
    },

    // 500
    ExistentialState(String),
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToBson(#[derivative(PartialEq = "ignore")] BsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "E4001000",
            Error::InvalidPath(_) => "E4001001",
            Error::InvalidForm(_) => "E4001002",
            Error::InvalidQuery(_) => "E4001003",
            Error::MissingCouponCode => "E4001004",
            Error::InvalidDateRange => "E4001005",
            Error::NonPositiveCouponValue => "E4001006",
            Error::NotAuthenticated => "E4011000",
            Error::OnlyBrandsMayCreateCampaigns { .. } => "E4031000",
            Error::OnlyBrandsMayRedeemCoupons { .. } => "E4031001",
            Error::OnlyCreatorsMayJoinCampaigns { .. } => "E4031002",
            Error::CampaignNotOwnedByBrand { .. } => "E4031003",
            Error::CouponNotOwnedByBrand { .. } => "E4031004",
            Error::PathDoesNotExist => "E4041000",
            Error::CampaignDoesNotExist { .. } => "E4041001",
            Error::ParticipationDoesNotExist { .. } => "E4041002",
            Error::NotificationDoesNotExist { .. } => "E4041003",
            Error::CouponNotFoundOrExpired { .. } => "E4041004",
            Error::CouponAlreadyRedeemed { .. } => "E4091000",
            Error::AlreadyParticipating { .. } => "E4091001",
            Error::CampaignNotAcceptingParticipants { .. } => "E4091002",
            Error::CampaignNotPublishable { .. } => "E4091003",
            Error::ParticipationNotApprovable { .. } => "E4091004",
            Error::ParticipationAlreadyHasCoupon { .. } => "E4091005",
            Error::CouponRequiresActiveParticipation { .. } => "E4091006",
            Error::ExistentialState(_) => "E5001000",
            Error::FailedDatabaseCall(_) => "E5001001",
            Error::FailedToSerializeToBson(_) => "E5001002",
            Error::IoError(_) => "E5001003",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidJson(_) => "The given json could not be parsed",
            Error::InvalidPath(_) => "The given path could not be parsed",
            Error::InvalidForm(_) => "The given form could not be parsed",
            Error::InvalidQuery(_) => "The given query could not be parsed",
            Error::MissingCouponCode => "Código do cupom é obrigatório.",
            Error::InvalidDateRange => "A data de início deve ser anterior à data de término.",
            Error::NonPositiveCouponValue => "O valor do cupom deve ser maior que zero.",
            Error::NotAuthenticated => "Não autorizado. Faça login para continuar.",
            Error::OnlyBrandsMayCreateCampaigns { .. } => "Apenas marcas podem criar campanhas.",
            Error::OnlyBrandsMayRedeemCoupons { .. } => "Apenas marcas podem resgatar cupons.",
            Error::OnlyCreatorsMayJoinCampaigns { .. } => {
                "Apenas criadores podem participar de campanhas."
            }
            Error::CampaignNotOwnedByBrand { .. } => {
                "Esta campanha não pertence à sua marca."
            }
            Error::CouponNotOwnedByBrand { .. } => {
                "Este cupom não pertence a uma campanha da sua marca."
            }
            Error::PathDoesNotExist => "The requested path was not found",
            Error::CampaignDoesNotExist { .. } => "A campanha solicitada não foi encontrada.",
            Error::ParticipationDoesNotExist { .. } => {
                "A participação solicitada não foi encontrada."
            }
            Error::NotificationDoesNotExist { .. } => {
                "A notificação solicitada não foi encontrada."
            }
            Error::CouponNotFoundOrExpired { .. } => "Cupom inválido ou expirado.",
            Error::CouponAlreadyRedeemed { .. } => "Este cupom já foi resgatado.",
            Error::AlreadyParticipating { .. } => "Você já participa desta campanha.",
            Error::CampaignNotAcceptingParticipants { .. } => {
                "Esta campanha não está aceitando participações."
            }
            Error::CampaignNotPublishable { .. } => {
                "Apenas campanhas em rascunho podem ser publicadas."
            }
            Error::ParticipationNotApprovable { .. } => {
                "Apenas participações pendentes podem ser aprovadas."
            }
            Error::ParticipationAlreadyHasCoupon { .. } => {
                "Esta participação já possui um cupom."
            }
            Error::CouponRequiresActiveParticipation { .. } => {
                "Apenas participações ativas podem receber cupons."
            }
            Error::ExistentialState(_) => "The server detected an invalid state",
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToBson(_) => {
                "An error occurred when serializing an object to bson"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Error::InvalidPath(_) => StatusCode::BAD_REQUEST,
            Error::InvalidForm(_) => StatusCode::BAD_REQUEST,
            Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::MissingCouponCode => StatusCode::BAD_REQUEST,
            Error::InvalidDateRange => StatusCode::BAD_REQUEST,
            Error::NonPositiveCouponValue => StatusCode::BAD_REQUEST,
            Error::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Error::OnlyBrandsMayCreateCampaigns { .. } => StatusCode::FORBIDDEN,
            Error::OnlyBrandsMayRedeemCoupons { .. } => StatusCode::FORBIDDEN,
            Error::OnlyCreatorsMayJoinCampaigns { .. } => StatusCode::FORBIDDEN,
            Error::CampaignNotOwnedByBrand { .. } => StatusCode::FORBIDDEN,
            Error::CouponNotOwnedByBrand { .. } => StatusCode::FORBIDDEN,
            Error::PathDoesNotExist => StatusCode::NOT_FOUND,
            Error::CampaignDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::ParticipationDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::NotificationDoesNotExist { .. } => StatusCode::NOT_FOUND,
            Error::CouponNotFoundOrExpired { .. } => StatusCode::NOT_FOUND,
            Error::CouponAlreadyRedeemed { .. } => StatusCode::CONFLICT,
            Error::AlreadyParticipating { .. } => StatusCode::CONFLICT,
            Error::CampaignNotAcceptingParticipants { .. } => StatusCode::CONFLICT,
            Error::CampaignNotPublishable { .. } => StatusCode::CONFLICT,
            Error::ParticipationNotApprovable { .. } => StatusCode::CONFLICT,
            Error::ParticipationAlreadyHasCoupon { .. } => StatusCode::CONFLICT,
            Error::CouponRequiresActiveParticipation { .. } => StatusCode::CONFLICT,
            Error::ExistentialState(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedDatabaseCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::FailedToSerializeToBson(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        #[derive(Serialize)]
        struct Envelope<'a> {
            error_code: &'static str,
            error_message: &'static str,
            error_meta: &'a Error,
        }

        HttpResponse::build(self.status_code()).json(&Envelope {
            error_code: self.error_code(),
            error_message: self.error_message(),
            error_meta: self,
        })
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<BsonError> for Error {
    fn from(error: BsonError) -> Error {
        Error::FailedToSerializeToBson(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidJson(err) => Some(err),
            Error::InvalidPath(err) => Some(err),
            Error::InvalidForm(err) => Some(err),
            Error::InvalidQuery(err) => Some(err),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToBson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
